//! Gate Heap Report CLI
//!
//! Heap usage reports for the ESP32 entry-gate controller.
//! Generates charts and summary tables from the device's memory log.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use gate_heap_report::charts::ChartConfig;
use gate_heap_report::commands::{
    display_version, execute_extract, execute_report, validate_args, validate_log_file,
    ExtractArgs, ReportArgs,
};
use gate_heap_report::utils::config::{CHART_HEIGHT, CHART_WIDTH, DEFAULT_INPUT_PATH};

/// Gate Heap Report - memory analysis for the entry-gate controller
#[derive(Parser, Debug)]
#[command(name = "gate-heap-report")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate charts and summary tables from a memory log
    Report {
        /// Measurement CSV to analyze
        #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
        input: PathBuf,

        /// Directory for charts, tables and the manifest
        #[arg(short, long = "out-dir", default_value = ".")]
        out_dir: PathBuf,

        /// Chart width in pixels
        #[arg(long, default_value_t = CHART_WIDTH)]
        width: usize,

        /// Chart height in pixels
        #[arg(long, default_value_t = CHART_HEIGHT)]
        height: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Do not write the JSON manifest
        #[arg(long)]
        no_manifest: bool,
    },

    /// Convert a raw serial capture into a measurement CSV
    Extract {
        /// Serial monitor capture containing MEMLOG lines
        #[arg(short, long)]
        log: PathBuf,

        /// Output CSV path
        #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
        output: PathBuf,
    },

    /// Validate a measurement CSV
    Validate {
        /// Path to the measurement CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Report {
            input,
            out_dir,
            width,
            height,
            summary,
            no_manifest,
        } => {
            let args = ReportArgs {
                input,
                output_dir: out_dir,
                chart_config: ChartConfig::new().with_size(width, height),
                print_summary: summary,
                write_manifest: !no_manifest,
            };

            // Validate args first
            validate_args(&args)?;

            execute_report(args)?;
        }

        Commands::Extract { log, output } => {
            execute_extract(ExtractArgs {
                serial_log: log,
                output_csv: output,
            })?;
        }

        Commands::Validate { file } => {
            validate_log_file(file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
