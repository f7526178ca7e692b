//! Loader for the heap measurement CSV and the raw serial capture.
//!
//! The CSV is the format the report consumes. The serial capture is what the
//! firmware actually prints: ESP-IDF log lines interleaved with
//! `MEMLOG,<ts>,<event>,<free>,<min_free>,<allocated>,<total_free>,<largest>`.

use super::schema::{MeasurementRow, MemoryLog};
use crate::utils::config::{
    MAX_COUNTER_VALUE, MEMLOG_FIELD_COUNT, MEMLOG_PREFIX, REQUIRED_COLUMNS,
};
use crate::utils::error::LoadError;
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

/// Column positions resolved from the CSV header
struct ColumnIndex {
    timestamp: usize,
    event: usize,
    free_heap: usize,
    total_allocated_bytes: usize,
    largest_free_block: usize,
    min_free_heap: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            timestamp: find(REQUIRED_COLUMNS[0])?,
            event: find(REQUIRED_COLUMNS[1])?,
            free_heap: find(REQUIRED_COLUMNS[2])?,
            total_allocated_bytes: find(REQUIRED_COLUMNS[3])?,
            largest_free_block: find(REQUIRED_COLUMNS[4])?,
            min_free_heap: find(REQUIRED_COLUMNS[5])?,
        })
    }
}

/// Load a memory log from a CSV file
///
/// **Public** - main entry point for loading
///
/// # Errors
/// * `LoadError::Io` - file missing or unreadable
/// * `LoadError::MissingColumn` - a required column is absent
/// * `LoadError::InvalidValue` - a numeric cell does not parse
pub fn load_memory_log(path: impl AsRef<Path>) -> Result<MemoryLog, LoadError> {
    let path = path.as_ref();
    info!("Loading memory log from: {}", path.display());

    let file = File::open(path)?;
    let log = read_memory_log(BufReader::new(file))?;

    info!("Loaded {} measurements", log.len());
    Ok(log)
}

/// Parse a memory log from any reader
pub fn read_memory_log<R: Read>(reader: R) -> Result<MemoryLog, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;
    let mut rows = Vec::new();

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = row_idx + 2;

        rows.push(MeasurementRow {
            timestamp: parse_numeric(&record, columns.timestamp, "timestamp", line)?,
            event: record
                .get(columns.event)
                .unwrap_or_default()
                .trim()
                .to_string(),
            free_heap: parse_numeric(&record, columns.free_heap, "free_heap", line)?,
            total_allocated_bytes: parse_numeric(
                &record,
                columns.total_allocated_bytes,
                "total_allocated_bytes",
                line,
            )?,
            largest_free_block: parse_numeric(
                &record,
                columns.largest_free_block,
                "largest_free_block",
                line,
            )?,
            min_free_heap: parse_numeric(&record, columns.min_free_heap, "min_free_heap", line)?,
        });
    }

    debug!("Parsed {} CSV rows", rows.len());
    Ok(MemoryLog::new(rows))
}

/// Parse an unsigned numeric cell.
///
/// Integral floats such as `"1234.0"` are accepted, matching how spreadsheet
/// exports often write counters. Values above `MAX_COUNTER_VALUE` are
/// rejected.
fn parse_numeric(
    record: &csv::StringRecord,
    col: usize,
    column: &str,
    line: usize,
) -> Result<u64, LoadError> {
    let raw = record.get(col).unwrap_or_default().trim();

    if let Ok(value) = raw.parse::<u64>() {
        if value <= MAX_COUNTER_VALUE {
            return Ok(value);
        }
    }

    match raw.parse::<f64>() {
        Ok(value)
            if value.is_finite()
                && value >= 0.0
                && value.fract() == 0.0
                && value <= MAX_COUNTER_VALUE as f64 =>
        {
            Ok(value as u64)
        }
        _ => Err(LoadError::InvalidValue {
            row: line,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Result of scanning a serial capture
#[derive(Debug, Clone, Default)]
pub struct MemlogExtraction {
    /// Rows recovered from well-formed MEMLOG lines
    pub rows: Vec<MeasurementRow>,

    /// MEMLOG lines that could not be parsed
    pub skipped: usize,
}

/// Scan a serial capture for MEMLOG lines
///
/// **Public** - used by the extract command
///
/// The marker may appear anywhere on the line so that monitor prefixes
/// (timestamps, ANSI colour codes) are tolerated.
pub fn extract_memlog_lines<R: BufRead>(reader: R) -> Result<MemlogExtraction, LoadError> {
    let mut extraction = MemlogExtraction::default();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(start) = line.find(MEMLOG_PREFIX) else {
            continue;
        };

        match parse_memlog_line(&line[start..]) {
            Some(row) => extraction.rows.push(row),
            None => {
                warn!("Skipping malformed MEMLOG line {}: {}", line_idx + 1, line.trim());
                extraction.skipped += 1;
            }
        }
    }

    debug!(
        "Extracted {} MEMLOG rows ({} skipped)",
        extraction.rows.len(),
        extraction.skipped
    );
    Ok(extraction)
}

/// Parse a single `MEMLOG,...` line.
///
/// Field order is the firmware's printf order; `total_free` is dropped since
/// it duplicates `free_heap` for the default capability set.
fn parse_memlog_line(line: &str) -> Option<MeasurementRow> {
    let fields: Vec<&str> = line.trim_end().split(',').map(str::trim).collect();
    if fields.len() != MEMLOG_FIELD_COUNT {
        return None;
    }

    let num = |i: usize| {
        fields[i]
            .parse::<u64>()
            .ok()
            .filter(|v| *v <= MAX_COUNTER_VALUE)
    };

    Some(MeasurementRow {
        timestamp: num(1)?,
        event: fields[2].to_string(),
        free_heap: num(3)?,
        min_free_heap: num(4)?,
        total_allocated_bytes: num(5)?,
        largest_free_block: num(7)?,
    })
}

/// Write rows in the six-column layout `read_memory_log` expects
pub fn write_memory_log<W: Write>(rows: &[MeasurementRow], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "timestamp,event,free_heap,total_allocated_bytes,largest_free_block,min_free_heap\n";

    #[test]
    fn test_read_basic_log() {
        let data = format!(
            "{HEADER}100,Before WiFi init,250000,40000,110000,240000\n\
             900,After WiFi init,200000,90000,100000,190000\n"
        );

        let log = read_memory_log(data.as_bytes()).unwrap();

        assert_eq!(log.len(), 2);
        assert_eq!(log.rows[1].event, "After WiFi init");
        assert_eq!(log.rows[1].free_heap, 200000);
        assert_eq!(log.memory_delta, vec![None, Some(50000)]);
    }

    #[test]
    fn test_column_order_not_significant() {
        let data = "event,min_free_heap,timestamp,largest_free_block,free_heap,total_allocated_bytes,extra\n\
                    Boot,10,5,20,30,40,ignored\n";

        let log = read_memory_log(data.as_bytes()).unwrap();
        let row = &log.rows[0];

        assert_eq!(row.timestamp, 5);
        assert_eq!(row.free_heap, 30);
        assert_eq!(row.total_allocated_bytes, 40);
        assert_eq!(row.largest_free_block, 20);
        assert_eq!(row.min_free_heap, 10);
    }

    #[test]
    fn test_missing_column() {
        let data = "timestamp,event,free_heap\n1,x,2\n";
        let err = read_memory_log(data.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "total_allocated_bytes"));
    }

    #[test]
    fn test_invalid_numeric() {
        let data = format!("{HEADER}abc,Boot,1,2,3,4\n");
        let err = read_memory_log(data.as_bytes()).unwrap_err();
        match err {
            LoadError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "timestamp");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_integral_float_accepted() {
        let data = format!("{HEADER}12.0,Boot,1,2,3,4\n");
        let log = read_memory_log(data.as_bytes()).unwrap();
        assert_eq!(log.rows[0].timestamp, 12);
    }

    #[test]
    fn test_parse_memlog_line_field_order() {
        let row = parse_memlog_line("MEMLOG,1234,Before Servo init,180000,170000,95000,180000,90000")
            .unwrap();

        assert_eq!(row.timestamp, 1234);
        assert_eq!(row.event, "Before Servo init");
        assert_eq!(row.free_heap, 180000);
        assert_eq!(row.min_free_heap, 170000);
        assert_eq!(row.total_allocated_bytes, 95000);
        assert_eq!(row.largest_free_block, 90000);
    }

    #[test]
    fn test_extract_ignores_log_noise() {
        let capture = "I (312) GATE_SYSTEM: [INIT] Starting gate system...\n\
                       MEMLOG,320,Before WiFi init,250000,249000,40000,250000,110000\n\
                       I (330) GATE_SYSTEM: Free heap: 250000 bytes\n\
                       [12:00:01] MEMLOG,900,After WiFi init,200000,199000,90000,200000,100000\n\
                       MEMLOG,broken\n";

        let extraction = extract_memlog_lines(capture.as_bytes()).unwrap();

        assert_eq!(extraction.rows.len(), 2);
        assert_eq!(extraction.skipped, 1);
        assert_eq!(extraction.rows[1].event, "After WiFi init");
    }

    #[test]
    fn test_written_log_reloads() {
        let rows = vec![MeasurementRow {
            timestamp: 7,
            event: "After open entry gate".to_string(),
            free_heap: 150000,
            total_allocated_bytes: 120000,
            largest_free_block: 80000,
            min_free_heap: 140000,
        }];

        let mut buffer = Vec::new();
        write_memory_log(&rows, &mut buffer).unwrap();
        let log = read_memory_log(buffer.as_slice()).unwrap();

        assert_eq!(log.rows, rows);
    }
}
