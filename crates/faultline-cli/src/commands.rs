use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Local;

use faultline_core::catalog::load_catalog;
use faultline_core::config::{
    parse_interval_policy, CliConfigOverrides, LayeredConfig, YearMonth,
};
use faultline_core::pipeline::run_pipeline;
use faultline_ingest::{parse_bulletins, BulletinStore};

use crate::cli::{Cli, Commands};
use crate::output;

const DEFAULT_CONFIG_FILE: &str = "faultline.toml";

pub async fn execute(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            catalog,
            cache_dir,
            start,
            end,
            interval,
            high_mag_threshold,
            out,
            offline,
        } => {
            let mut config = config;
            config.update_from_cli(CliConfigOverrides {
                catalog_path: catalog,
                cache_dir,
                period_start: parse_month_arg(start.as_deref())?,
                period_end: parse_month_arg(end.as_deref())?,
                interval: interval.as_deref().map(parse_interval_policy).transpose()?,
                high_mag_threshold,
            });
            run(&config, &out, offline).await
        }
        Commands::Config => {
            output::print_config(&config);
            Ok(())
        }
    }
}

fn parse_month_arg(arg: Option<&str>) -> Result<Option<YearMonth>> {
    arg.map(|s| s.parse::<YearMonth>().map_err(Into::into)).transpose()
}

fn load_config(explicit: Option<&Path>) -> Result<LayeredConfig> {
    let config = LayeredConfig::with_defaults();

    let config = match explicit {
        Some(path) => config
            .load_from_file(path)
            .with_context(|| format!("loading config file {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            config.load_from_file(DEFAULT_CONFIG_FILE)?
        }
        None => config,
    };

    Ok(config.load_from_env())
}

async fn run(config: &LayeredConfig, out: &Path, offline: bool) -> Result<()> {
    let start = config.period_start.value;
    let end = config.period_end.value;

    // Acquire bulletins
    let store = BulletinStore::new(&config.cache_dir.value)?;
    let files = if offline {
        store.cached_period(start, end)
    } else {
        store.fetch_period(start, end).await?
    };
    if files.is_empty() {
        bail!("no bulletin files available for {}..{}", start, end);
    }

    let batch = parse_bulletins(&files);
    if batch.events.is_empty() {
        bail!("bulletins contained no events");
    }

    // Load the fault catalog and run the core pipeline
    let catalog = load_catalog(&config.catalog_path.value)?;
    let result = run_pipeline(
        batch.events,
        catalog,
        config,
        Local::now().date_naive(),
    )?;

    // Export for the visualizer
    fs::create_dir_all(out)?;
    let events_path = out.join("events.json");
    let faults_path = out.join("faults.geojson");
    write_json(&events_path, &result.events)?;
    write_json(&faults_path, &result.filtered_collection)?;
    tracing::info!(
        events = result.events.len(),
        faults = result.faults.len(),
        out = %out.display(),
        "export complete"
    );

    output::print_summary(&result, batch.failed_files, &events_path, &faults_path);

    Ok(())
}

fn write_json<T: serde::Serialize>(path: &PathBuf, value: &T) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("creating output file {}", path.display()))?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
