//! Extract command implementation.
//!
//! Converts a raw serial capture into the measurement CSV the report reads.

use super::models::ExtractArgs;
use crate::parser::{extract_memlog_lines, write_memory_log, MemlogExtraction};
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs::File;
use std::io::{BufReader, BufWriter};

/// Execute the extract command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Serial capture missing or unreadable
/// * No MEMLOG lines found
/// * CSV write errors
pub fn execute_extract(args: ExtractArgs) -> Result<MemlogExtraction> {
    info!("Extracting MEMLOG lines from: {}", args.serial_log.display());

    let file = File::open(&args.serial_log)
        .with_context(|| format!("Failed to open serial log {}", args.serial_log.display()))?;
    let extraction = extract_memlog_lines(BufReader::new(file))
        .context("Failed to read serial log")?;

    if extraction.rows.is_empty() {
        anyhow::bail!(
            "No MEMLOG lines found in {}",
            args.serial_log.display()
        );
    }

    if extraction.skipped > 0 {
        warn!("{} malformed MEMLOG lines were skipped", extraction.skipped);
    }

    if let Some(parent) = args.output_csv.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let out = File::create(&args.output_csv)
        .with_context(|| format!("Failed to create {}", args.output_csv.display()))?;
    write_memory_log(&extraction.rows, BufWriter::new(out))
        .with_context(|| format!("Failed to write {}", args.output_csv.display()))?;

    info!(
        "Wrote {} measurements to {}",
        extraction.rows.len(),
        args.output_csv.display()
    );

    Ok(extraction)
}
