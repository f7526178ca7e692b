//! CSV export of the summary tables.
//!
//! Column headers come from the serde renames on the row types, so a
//! written file reloads into the same type.

use super::{ensure_parent_dir, validate_path};
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Write summary rows with a header line
///
/// **Public** - main entry point for CSV output
///
/// An empty table still gets its header line.
pub fn write_summary_csv<T: Serialize>(
    rows: &[T],
    headers: &[&str],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    validate_path(output_path)?;
    ensure_parent_dir(output_path)?;

    let file = File::create(output_path)?;
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record(headers)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("Table written: {} ({} rows)", output_path.display(), rows.len());
    Ok(())
}

/// Read summary rows back from a CSV written by `write_summary_csv`
pub fn read_summary_csv<T: DeserializeOwned>(input_path: impl AsRef<Path>) -> Result<Vec<T>, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading table from: {}", input_path.display());

    let mut reader = ::csv::Reader::from_path(input_path)?;
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, ::csv::Error>>()?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::InitSummaryRow;

    #[test]
    fn test_write_and_read_summary() {
        let rows = vec![InitSummaryRow {
            operation: "WiFi Init".to_string(),
            before: 100000,
            after: 95000,
            delta: 5000,
            percent_of_initial: 5.0,
        }];
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("init.csv");

        write_summary_csv(&rows, InitSummaryRow::HEADERS, &path).unwrap();
        let loaded: Vec<InitSummaryRow> = read_summary_csv(&path).unwrap();

        assert_eq!(loaded, rows);
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let rows: Vec<InitSummaryRow> = Vec::new();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("empty.csv");

        write_summary_csv(&rows, InitSummaryRow::HEADERS, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content.trim_end(),
            "Operation,Before (bytes),After (bytes),Delta (bytes),% of Initial Memory"
        );
    }
}
