use crate::charts::ChartConfig;
use crate::utils::config::DEFAULT_INPUT_PATH;
use std::path::PathBuf;

/// Arguments for the report command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ReportArgs {
    /// Measurement CSV to analyze
    pub input: PathBuf,

    /// Directory receiving charts, tables and the manifest
    pub output_dir: PathBuf,

    /// Chart dimensions
    pub chart_config: ChartConfig,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Write the JSON manifest alongside the artifacts
    pub write_manifest: bool,
}

impl Default for ReportArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from("."),
            chart_config: ChartConfig::default(),
            print_summary: false,
            write_manifest: true,
        }
    }
}

/// Arguments for the extract command
#[derive(Debug, Clone)]
pub struct ExtractArgs {
    /// Raw serial capture containing MEMLOG lines
    pub serial_log: PathBuf,

    /// CSV to write
    pub output_csv: PathBuf,
}

impl Default for ExtractArgs {
    fn default() -> Self {
        Self {
            serial_log: PathBuf::from("serial.log"),
            output_csv: PathBuf::from(DEFAULT_INPUT_PATH),
        }
    }
}
