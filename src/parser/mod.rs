//! Memory log parsing and schema definitions.
//!
//! This module handles:
//! - Loading the measurement CSV
//! - Extracting MEMLOG lines from a raw serial capture
//! - Defining the in-memory row and log types

pub mod memlog;
pub mod schema;

// Re-export main types
pub use memlog::{
    extract_memlog_lines, load_memory_log, read_memory_log, write_memory_log, MemlogExtraction,
};
pub use schema::{fragmentation_index, signed_delta, MeasurementRow, MemoryLog};
