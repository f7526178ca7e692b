//! In-memory representation of the heap measurement log.
//!
//! One `MeasurementRow` per `print_memory_stats()` call on the device.

use serde::{Deserialize, Serialize};

/// A single heap snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    /// Device uptime in milliseconds
    pub timestamp: u64,

    /// Label of what just happened (e.g. "Before WiFi init")
    pub event: String,

    /// Bytes currently free
    pub free_heap: u64,

    /// Bytes currently allocated
    pub total_allocated_bytes: u64,

    /// Bytes in the largest contiguous free block
    pub largest_free_block: u64,

    /// Low-water mark of free heap since boot
    pub min_free_heap: u64,
}

impl MeasurementRow {
    /// Percentage of free memory outside the largest free block.
    ///
    /// `None` when `free_heap` is zero.
    pub fn fragmentation_percent(&self) -> Option<f64> {
        fragmentation_index(self.free_heap as f64, self.largest_free_block as f64)
    }
}

/// `(1 - largest_free_block / free_heap) * 100`, or `None` if the ratio is not finite
pub fn fragmentation_index(free_heap: f64, largest_free_block: f64) -> Option<f64> {
    let ratio = largest_free_block / free_heap;
    if ratio.is_finite() {
        Some((1.0 - ratio) * 100.0)
    } else {
        None
    }
}

/// `minuend - subtrahend` as a signed byte count, clamped to the `i64` range
pub fn signed_delta(minuend: u64, subtrahend: u64) -> i64 {
    (minuend as i128 - subtrahend as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

/// Ordered measurement log plus the per-row allocation delta
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    pub rows: Vec<MeasurementRow>,

    /// `total_allocated_bytes` minus the previous row's; `None` for the first row
    pub memory_delta: Vec<Option<i64>>,
}

impl MemoryLog {
    /// Build a log from rows in capture order, deriving `memory_delta`
    pub fn new(rows: Vec<MeasurementRow>) -> Self {
        let memory_delta = std::iter::once(None)
            .chain(rows.windows(2).map(|pair| {
                Some(signed_delta(pair[1].total_allocated_bytes, pair[0].total_allocated_bytes))
            }))
            .take(rows.len())
            .collect();

        Self { rows, memory_delta }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row whose event equals `label` exactly
    pub fn first_event(&self, label: &str) -> Option<&MeasurementRow> {
        self.rows.iter().find(|row| row.event == label)
    }

    pub fn has_event(&self, label: &str) -> bool {
        self.first_event(label).is_some()
    }

    /// Largest timestamp in the log
    pub fn max_timestamp(&self) -> u64 {
        self.rows.iter().map(|row| row.timestamp).max().unwrap_or(0)
    }

    /// Mean fragmentation over rows with a defined index
    pub fn average_fragmentation(&self) -> Option<f64> {
        let values: Vec<f64> = self
            .rows
            .iter()
            .filter_map(MeasurementRow::fragmentation_percent)
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}
