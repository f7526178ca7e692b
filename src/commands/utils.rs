use crate::aggregator::{gate_events, gate_operations, init_events};
use crate::parser::load_memory_log;
use crate::utils::config::{FINAL_INIT_EVENT, SCHEMA_VERSION};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Validate a measurement CSV and print what the report would see
pub fn validate_log_file(file_path: PathBuf) -> Result<()> {
    println!("Validating memory log: {}", file_path.display());

    let log = load_memory_log(&file_path)
        .with_context(|| format!("Failed to load {}", file_path.display()))?;

    let gate_rows = gate_events(&log).len();
    let operations = gate_operations(&log).len();

    println!("✓ Valid memory log");
    println!("  Rows: {}", log.len());
    println!("  Last Timestamp: {} ms", log.max_timestamp());
    println!("  Init Events: {}", init_events(&log).len());
    println!("  Gate Events: {}", gate_rows);
    println!("  Gate Operations: {}", operations);
    match log.average_fragmentation() {
        Some(avg) => println!("  Avg Fragmentation: {:.2}%", avg),
        None => println!("  Avg Fragmentation: n/a"),
    }
    if !log.has_event(FINAL_INIT_EVENT) {
        println!("  Note: no {:?} event, the distribution pie will be skipped", FINAL_INIT_EVENT);
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Gate Heap Report v{}", env!("CARGO_PKG_VERSION"));
    println!("Manifest Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Heap usage reports for the ESP32 entry-gate controller.");
}
