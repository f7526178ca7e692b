//! Report command implementation.
//!
//! The report command:
//! 1. Loads the measurement log
//! 2. Pairs gate operations and derives summary tables
//! 3. Renders the chart images
//! 4. Writes the summary CSVs
//! 5. Writes the run manifest

use super::models::ReportArgs;
use crate::aggregator::{
    analyze, FragmentationSummaryRow, InitSummaryRow, MemoryReport, OperationSummaryRow,
};
use crate::charts::{
    composition_chart, distribution_pie_chart, fragmentation_chart, fragmentation_table_chart,
    gate_delta_chart, impact_chart, init_table_chart, operation_table_chart, recovery_chart,
    timeline_chart,
};
use crate::output::{
    generate_text_summary, write_manifest, write_summary_csv, write_png, ReportManifest,
    SkippedArtifact,
};
use crate::parser::{load_memory_log, MemoryLog};
use crate::utils::config::*;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Execute the report command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The manifest describing every artifact written or skipped
///
/// # Errors
/// * Missing or malformed input log
/// * Missing initialization events
/// * File write errors
pub fn execute_report(args: ReportArgs) -> Result<ReportManifest> {
    let start_time = Instant::now();

    info!("Starting heap report for: {}", args.input.display());

    // Step 1: Load the log
    info!("Step 1/5: Loading memory log...");
    let log = load_memory_log(&args.input)
        .with_context(|| format!("Failed to load memory log {}", args.input.display()))?;

    if log.is_empty() {
        anyhow::bail!("Memory log {} contains no measurements", args.input.display());
    }

    // Step 2: Derive metrics
    info!("Step 2/5: Pairing gate operations and deriving metrics...");
    let report = analyze(&log).context("Failed to derive initialization summary")?;

    debug!(
        "Derived {} gate operations, {} impact rows, {} fragmentation stages",
        report.gate_operations.len(),
        report.impact.len(),
        report.fragmentation_summary.len()
    );

    let mut manifest = ReportManifest {
        version: SCHEMA_VERSION.to_string(),
        input: args.input.display().to_string(),
        row_count: log.len(),
        gate_operations: report.gate_operations.len(),
        average_fragmentation: report.average_fragmentation,
        artifacts: Vec::new(),
        skipped: Vec::new(),
        generated_at: chrono::Utc::now(),
    };

    // Step 3: Charts
    info!("Step 3/5: Rendering charts...");
    render_charts(&log, &report, &args, &mut manifest)?;

    // Step 4: Summary tables
    info!("Step 4/5: Writing summary tables...");
    write_tables(&report, &args.output_dir, &mut manifest)?;

    // Step 5: Manifest
    if args.write_manifest {
        info!("Step 5/5: Writing manifest...");
        let path = args.output_dir.join(MANIFEST_JSON);
        write_manifest(&manifest, &path).context("Failed to write report manifest")?;
    } else {
        info!("Step 5/5: Skipping manifest (not requested)");
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("HEAP REPORT SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Input:      {}", args.input.display());
        println!("Artifacts:  {}", manifest.artifacts.len());
        println!("\n{}", generate_text_summary(&report, log.len()));
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!(
        "Report completed in {:.2}s ({} artifacts, {} skipped)",
        elapsed.as_secs_f64(),
        manifest.artifacts.len(),
        manifest.skipped.len()
    );

    Ok(manifest)
}

/// Render and write the ten chart images
///
/// **Private** - internal helper for execute_report
fn render_charts(
    log: &MemoryLog,
    report: &MemoryReport,
    args: &ReportArgs,
    manifest: &mut ReportManifest,
) -> Result<()> {
    let config = &args.chart_config;
    let out_dir = &args.output_dir;

    emit_chart(out_dir, TIMELINE_CHART, &timeline_chart(log, config)?, manifest)?;

    if report.impact.is_empty() {
        skip(
            manifest,
            &chart_file(IMPACT_CHART),
            "no operation logged both Before and After events",
        );
    } else {
        emit_chart(out_dir, IMPACT_CHART, &impact_chart(&report.impact, config)?, manifest)?;
    }

    emit_chart(
        out_dir,
        RECOVERY_CHART,
        &recovery_chart(&report.gate_operations, config),
        manifest,
    )?;
    emit_chart(out_dir, COMPOSITION_CHART, &composition_chart(log, config)?, manifest)?;
    emit_chart(
        out_dir,
        FRAGMENTATION_CHART,
        &fragmentation_chart(log, report.average_fragmentation, config)?,
        manifest,
    )?;
    emit_chart(
        out_dir,
        GATE_DELTA_CHART,
        &gate_delta_chart(&report.gate_operations, config),
        manifest,
    )?;
    emit_chart(out_dir, INIT_TABLE_CHART, &init_table_chart(&report.init_summary), manifest)?;
    emit_chart(
        out_dir,
        OPERATION_TABLE_CHART,
        &operation_table_chart(&report.operation_summary),
        manifest,
    )?;
    emit_chart(
        out_dir,
        FRAGMENTATION_TABLE_CHART,
        &fragmentation_table_chart(&report.fragmentation_summary),
        manifest,
    )?;

    match &report.distribution {
        Some(distribution) if distribution.total() > 0 => {
            emit_chart(
                out_dir,
                DISTRIBUTION_PIE_CHART,
                &distribution_pie_chart(distribution, config)?,
                manifest,
            )?;
        }
        Some(_) => skip(
            manifest,
            &chart_file(DISTRIBUTION_PIE_CHART),
            "allocated and free bytes are both zero",
        ),
        None => skip(
            manifest,
            &chart_file(DISTRIBUTION_PIE_CHART),
            &format!("no {:?} event", FINAL_INIT_EVENT),
        ),
    }

    Ok(())
}

/// Write the three summary CSVs
///
/// **Private** - internal helper for execute_report
fn write_tables(report: &MemoryReport, out_dir: &Path, manifest: &mut ReportManifest) -> Result<()> {
    write_summary_csv(
        &report.init_summary,
        InitSummaryRow::HEADERS,
        out_dir.join(INIT_SUMMARY_CSV),
    )
    .context("Failed to write initialization summary")?;
    manifest.artifacts.push(INIT_SUMMARY_CSV.to_string());

    write_summary_csv(
        &report.operation_summary,
        OperationSummaryRow::HEADERS,
        out_dir.join(OPERATION_SUMMARY_CSV),
    )
    .context("Failed to write operation summary")?;
    manifest.artifacts.push(OPERATION_SUMMARY_CSV.to_string());

    write_summary_csv(
        &report.fragmentation_summary,
        FragmentationSummaryRow::HEADERS,
        out_dir.join(FRAGMENTATION_SUMMARY_CSV),
    )
    .context("Failed to write fragmentation summary")?;
    manifest.artifacts.push(FRAGMENTATION_SUMMARY_CSV.to_string());

    Ok(())
}

/// File name for a chart stem
pub fn chart_file(stem: &str) -> String {
    format!("{}.{}", stem, CHART_EXTENSION)
}

fn emit_chart(out_dir: &Path, stem: &str, svg: &str, manifest: &mut ReportManifest) -> Result<()> {
    let name = chart_file(stem);
    let path: PathBuf = out_dir.join(&name);
    write_png(svg, &path).with_context(|| format!("Failed to write chart {}", path.display()))?;
    manifest.artifacts.push(name);
    Ok(())
}

fn skip(manifest: &mut ReportManifest, name: &str, reason: &str) {
    warn!("Skipping {}: {}", name, reason);
    manifest.skipped.push(SkippedArtifact {
        name: name.to_string(),
        reason: reason.to_string(),
    });
}

/// Validate report arguments
///
/// **Public** - can be called before execute_report for early validation
pub fn validate_args(args: &ReportArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if args.output_dir.exists() && !args.output_dir.is_dir() {
        anyhow::bail!(
            "Output path is not a directory: {}",
            args.output_dir.display()
        );
    }

    let config = &args.chart_config;
    if config.width < 400 || config.height < 300 {
        anyhow::bail!("Chart size must be at least 400x300 pixels");
    }

    if config.width > 10_000 || config.height > 10_000 {
        anyhow::bail!("Chart size is too large (max 10000 pixels per side)");
    }

    Ok(())
}
