use crate::error::CliError;
use engine_runtime::scheduler::RunSummary;
use model::core::offset::{Watermark, Watermarks};
use serde::Serialize;

#[derive(Serialize)]
struct WatermarkReport<'a> {
    table: &'a str,
    last_offset: i64,
    partitions: Vec<Watermark>,
}

fn generate_report_json(summary: &RunSummary) -> Result<String, CliError> {
    let json = serde_json::to_string_pretty(summary)?;
    Ok(json)
}

pub async fn write_report(summary: &RunSummary, path: &str) -> Result<(), CliError> {
    let report_json = generate_report_json(summary)?;
    tokio::fs::write(path, report_json).await?;
    Ok(())
}

pub fn print_summary(summary: &RunSummary) {
    println!("Ingestion {} -> {}:", summary.source, summary.destination);
    println!("-----------------------------");
    println!("{:<18} {}", "Mode", summary.mode);
    println!("{:<18} {}", "Cycles", summary.metrics.cycles);
    println!("{:<18} {}", "Rows inserted", summary.metrics.records_inserted);
    println!("{:<18} {}", "Failed cycles", summary.metrics.failed_cycles);
    println!(
        "{:<18} {}",
        "Tracker fallbacks", summary.metrics.tracker_fallbacks
    );
    println!("{:<18} {:?}", "Stopped", summary.stop_reason);
    let watermarks = summary
        .watermarks
        .as_ref()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    println!("{:<18} {}", "Last watermarks", watermarks);
}

pub fn watermark_json(table: &str, marks: &Watermarks) -> Result<String, CliError> {
    let report = WatermarkReport {
        table,
        last_offset: marks.max_offset(),
        partitions: marks.iter().collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn print_watermark_table(table: &str, marks: &Watermarks) {
    println!("Watermarks for '{table}':");
    println!("-----------------------------");
    println!("{:<16} {}", "Partition", "Offset");
    for mark in marks.iter() {
        println!("{:<16} {}", mark.partition_id, mark.offset);
    }
    println!("{:<16} {}", "Last offset", marks.max_offset());
}
