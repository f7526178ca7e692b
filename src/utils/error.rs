//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading a memory log
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open memory log: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Row {row}: invalid value for {column}: {value:?}")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// Errors that can occur while deriving metrics
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Required event not found in log: {0:?}")]
    MissingEvent(String),
}

/// Errors that can occur during chart rendering
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("No data to plot for {0}")]
    EmptySeries(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to write CSV: {0}")]
    CsvFailed(#[from] csv::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Failed to render chart: {0}")]
    RenderFailed(String),
}
