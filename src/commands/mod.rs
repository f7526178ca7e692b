//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod extract;
pub mod models;
pub mod report;
pub mod utils;

// Re-export main command functions
pub use extract::execute_extract;
pub use models::{ExtractArgs, ReportArgs};
pub use report::{chart_file, execute_report, validate_args};
pub use utils::{display_version, validate_log_file};
