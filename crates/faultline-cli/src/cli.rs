use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "faultline",
    version,
    about = "Enrich seismic bulletins with nearest-fault matches and geodesic distances"
)]
pub struct Cli {
    /// Path to a TOML config file (default: ./faultline.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch bulletins, run the enrichment pipeline, and export the result
    Run {
        /// Fault catalog GeoJSON path
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory bulletin files are cached in
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// First bulletin month of the query period (YYYY-MM)
        #[arg(long)]
        start: Option<String>,

        /// Last bulletin month of the query period (YYYY-MM)
        #[arg(long)]
        end: Option<String>,

        /// Time window for the final table: full or recent-window
        #[arg(long)]
        interval: Option<String>,

        /// Magnitude threshold highlighted by the visualizer
        #[arg(long)]
        high_mag_threshold: Option<f64>,

        /// Output directory for events.json and faults.geojson
        #[arg(long, default_value = "out")]
        out: PathBuf,

        /// Use only already-cached bulletins, no network
        #[arg(long)]
        offline: bool,
    },

    /// Show the effective configuration and where each value came from
    Config,
}
