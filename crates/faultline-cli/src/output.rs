//! Styled terminal output: run summaries and config inspection.

use std::path::Path;

use console::style;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use faultline_core::config::LayeredConfig;
use faultline_core::pipeline::PipelineOutput;

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Stage")]
    stage: &'static str,
    #[tabled(rename = "Count")]
    count: String,
}

pub fn print_summary(
    result: &PipelineOutput,
    failed_files: usize,
    events_path: &Path,
    faults_path: &Path,
) {
    let report = &result.report;
    let high_mag = result
        .events
        .iter()
        .filter(|e| e.event.magnitude >= result.high_mag_threshold)
        .count();

    let rows = vec![
        SummaryRow { stage: "Events parsed", count: report.events_in.to_string() },
        SummaryRow { stage: "Bulletin files failed", count: failed_files.to_string() },
        SummaryRow { stage: "Catalog features", count: report.catalog_features.to_string() },
        SummaryRow {
            stage: "Dropped geometries",
            count: report.dropped_geometries.to_string(),
        },
        SummaryRow {
            stage: "Faults in bounding box",
            count: report.filtered_features.to_string(),
        },
        SummaryRow { stage: "Matched events", count: report.matched_events.to_string() },
        SummaryRow { stage: "Unmatched events", count: report.unmatched_events.to_string() },
        SummaryRow {
            stage: "Missing distances",
            count: report.missing_distances.to_string(),
        },
        SummaryRow { stage: "Events exported", count: report.events_out.to_string() },
        SummaryRow {
            stage: "High-magnitude events",
            count: format!("{} (>= {})", high_mag, result.high_mag_threshold),
        },
    ];

    println!("\n{}", style("Pipeline summary").bold().cyan());
    println!("{}", Table::new(rows).with(Style::rounded()));
    println!(
        "\n{} {}",
        style("Events:").bold(),
        style(events_path.display()).green()
    );
    println!(
        "{} {}",
        style("Faults:").bold(),
        style(faults_path.display()).green()
    );
}

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn print_config(config: &LayeredConfig) {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: format!("{:?}", source),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    println!("{}", style("Effective configuration").bold().cyan());
    println!("{}", Table::new(rows).with(Style::rounded()));
}
