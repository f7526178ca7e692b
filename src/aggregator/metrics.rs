//! Derive memory metrics and summary tables from the measurement log.
//!
//! Summary rows carry serde renames so that the CSV exports use the same
//! human-readable column headers as the table images.

use super::events::{gate_events, pair_gate_events, EventPhase};
use crate::parser::{fragmentation_index, signed_delta, MeasurementRow, MemoryLog};
use crate::utils::config::{
    DURING_OPERATIONS_LABEL, FINAL_INIT_EVENT, FRAGMENTATION_STAGES, INIT_SUMMARY_ORDER,
};
use crate::utils::error::AnalysisError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One matched before/after gate actuation
#[derive(Debug, Clone, PartialEq)]
pub struct GateOperationRecord {
    /// 1-based position in pairing order
    pub operation_number: usize,
    pub free_heap_before: u64,
    pub free_heap_after: u64,
    pub allocated_before: u64,
    pub allocated_after: u64,

    /// `free_heap_before - free_heap_after`
    pub memory_used: i64,

    /// `allocated_after - allocated_before`
    pub allocation_increase: i64,
}

impl GateOperationRecord {
    pub fn from_pair(operation_number: usize, before: &MeasurementRow, after: &MeasurementRow) -> Self {
        Self {
            operation_number,
            free_heap_before: before.free_heap,
            free_heap_after: after.free_heap,
            allocated_before: before.total_allocated_bytes,
            allocated_after: after.total_allocated_bytes,
            memory_used: signed_delta(before.free_heap, after.free_heap),
            allocation_increase: signed_delta(after.total_allocated_bytes, before.total_allocated_bytes),
        }
    }
}

/// Build one record per positional before/after gate pair
///
/// **Public** - main entry point for gate metrics
pub fn gate_operations(log: &MemoryLog) -> Vec<GateOperationRecord> {
    let gate_rows = gate_events(log);
    pair_gate_events(&gate_rows)
        .into_iter()
        .enumerate()
        .map(|(i, (before, after))| GateOperationRecord::from_pair(i + 1, before, after))
        .collect()
}

/// Mean of `memory_used` across operations
pub fn average_memory_used(operations: &[GateOperationRecord]) -> Option<f64> {
    mean(operations.iter().map(|op| op.memory_used as f64))
}

/// Row of the initialization summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitSummaryRow {
    #[serde(rename = "Operation")]
    pub operation: String,

    #[serde(rename = "Before (bytes)")]
    pub before: u64,

    #[serde(rename = "After (bytes)")]
    pub after: u64,

    #[serde(rename = "Delta (bytes)")]
    pub delta: i64,

    #[serde(rename = "% of Initial Memory")]
    pub percent_of_initial: f64,
}

impl InitSummaryRow {
    pub const HEADERS: &'static [&'static str] = &[
        "Operation",
        "Before (bytes)",
        "After (bytes)",
        "Delta (bytes)",
        "% of Initial Memory",
    ];
}

/// Free heap consumed by each subsystem's initialization
///
/// **Public** - feeds the initialization table and CSV
///
/// Rows: `WiFi Init`, `Servo Init`, `MQTT Init`, then `Total System Init`
/// spanning "Before WiFi init" to "After MQTT init". Each value is taken from
/// the first row with the exact label. The percentage is relative to the
/// free heap before WiFi init.
///
/// # Errors
/// * `AnalysisError::MissingEvent` - a required label is absent
pub fn summarize_initialization(log: &MemoryLog) -> Result<Vec<InitSummaryRow>, AnalysisError> {
    let free_heap_at = |label: String| {
        log.first_event(&label)
            .map(|row| row.free_heap)
            .ok_or(AnalysisError::MissingEvent(label))
    };

    let mut spans = Vec::with_capacity(INIT_SUMMARY_ORDER.len() + 1);
    for subsystem in INIT_SUMMARY_ORDER {
        spans.push((
            format!("{} Init", subsystem),
            free_heap_at(format!("Before {} init", subsystem))?,
            free_heap_at(format!("After {} init", subsystem))?,
        ));
    }
    spans.push((
        "Total System Init".to_string(),
        free_heap_at(format!("Before {} init", INIT_SUMMARY_ORDER[0]))?,
        free_heap_at(FINAL_INIT_EVENT.to_string())?,
    ));

    let initial = spans[0].1;
    if initial == 0 {
        warn!("Free heap before first init is zero; percentages reported as 0");
    }

    Ok(spans
        .into_iter()
        .map(|(operation, before, after)| {
            let delta = signed_delta(before, after);
            InitSummaryRow {
                operation,
                before,
                after,
                delta,
                percent_of_initial: percent_of(delta as f64, initial as f64),
            }
        })
        .collect())
}

/// Row of the gate operation summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSummaryRow {
    #[serde(rename = "Operation")]
    pub operation: String,

    #[serde(rename = "Free Heap Before")]
    pub free_heap_before: f64,

    #[serde(rename = "Free Heap After")]
    pub free_heap_after: f64,

    #[serde(rename = "Memory Used")]
    pub memory_used: f64,

    #[serde(rename = "Allocated Before")]
    pub allocated_before: f64,

    #[serde(rename = "Allocated After")]
    pub allocated_after: f64,
}

impl OperationSummaryRow {
    pub const HEADERS: &'static [&'static str] = &[
        "Operation",
        "Free Heap Before",
        "Free Heap After",
        "Memory Used",
        "Allocated Before",
        "Allocated After",
    ];
}

/// One `Gate Op #n` row per operation plus an `Average` row.
///
/// The average row is omitted when there are no operations.
pub fn summarize_operations(operations: &[GateOperationRecord]) -> Vec<OperationSummaryRow> {
    let mut rows: Vec<OperationSummaryRow> = operations
        .iter()
        .map(|op| OperationSummaryRow {
            operation: format!("Gate Op #{}", op.operation_number),
            free_heap_before: op.free_heap_before as f64,
            free_heap_after: op.free_heap_after as f64,
            memory_used: op.memory_used as f64,
            allocated_before: op.allocated_before as f64,
            allocated_after: op.allocated_after as f64,
        })
        .collect();

    if rows.is_empty() {
        debug!("No gate operations; operation summary is empty");
        return rows;
    }

    let column_mean = |f: fn(&OperationSummaryRow) -> f64| mean(rows.iter().map(f)).unwrap_or(0.0);
    let average = OperationSummaryRow {
        operation: "Average".to_string(),
        free_heap_before: column_mean(|r| r.free_heap_before),
        free_heap_after: column_mean(|r| r.free_heap_after),
        memory_used: column_mean(|r| r.memory_used),
        allocated_before: column_mean(|r| r.allocated_before),
        allocated_after: column_mean(|r| r.allocated_after),
    };
    rows.push(average);
    rows
}

/// Row of the fragmentation summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentationSummaryRow {
    #[serde(rename = "Operation Stage")]
    pub stage: String,

    #[serde(rename = "Free Heap")]
    pub free_heap: f64,

    #[serde(rename = "Largest Free Block")]
    pub largest_free_block: f64,

    /// Empty when free heap is zero
    #[serde(rename = "Fragmentation Index (%)")]
    pub fragmentation_index: Option<f64>,
}

impl FragmentationSummaryRow {
    pub const HEADERS: &'static [&'static str] = &[
        "Operation Stage",
        "Free Heap",
        "Largest Free Block",
        "Fragmentation Index (%)",
    ];
}

/// Fragmentation at key boot stages and on average during gate operations
///
/// **Public** - feeds the fragmentation table and CSV
///
/// Boot stages are included only when present in the log. The
/// `During Operations` row averages free heap and largest free block over
/// every gate row (paired or not) and computes the index from those means.
pub fn summarize_fragmentation(log: &MemoryLog) -> Vec<FragmentationSummaryRow> {
    let mut rows: Vec<FragmentationSummaryRow> = FRAGMENTATION_STAGES
        .iter()
        .filter_map(|stage| log.first_event(stage))
        .map(|row| FragmentationSummaryRow {
            stage: row.event.clone(),
            free_heap: row.free_heap as f64,
            largest_free_block: row.largest_free_block as f64,
            fragmentation_index: row.fragmentation_percent(),
        })
        .collect();

    let gate_rows = gate_events(log);
    if let (Some(free_heap), Some(largest_free_block)) = (
        mean(gate_rows.iter().map(|r| r.free_heap as f64)),
        mean(gate_rows.iter().map(|r| r.largest_free_block as f64)),
    ) {
        rows.push(FragmentationSummaryRow {
            stage: DURING_OPERATIONS_LABEL.to_string(),
            free_heap,
            largest_free_block,
            fragmentation_index: fragmentation_index(free_heap, largest_free_block),
        });
    }

    debug!("Fragmentation summary has {} stages", rows.len());
    rows
}

/// Mean free-heap drop across one labelled operation
#[derive(Debug, Clone, PartialEq)]
pub struct OperationImpact {
    /// Label with the phase word removed, e.g. "WiFi init"
    pub operation: String,
    pub before_mean: f64,
    pub after_mean: f64,

    /// `before_mean - after_mean`
    pub impact: f64,
}

/// Pivot every Before/After row by operation name
///
/// **Public** - feeds the memory impact bar chart
///
/// The phase word may appear anywhere in the label; the operation name is
/// whatever follows it. Operations observed in only one phase are dropped.
/// Result is sorted by impact, largest first.
pub fn memory_impact_by_operation(log: &MemoryLog) -> Vec<OperationImpact> {
    // (operation, before samples, after samples) in first-seen order
    let mut groups: Vec<(&str, Vec<f64>, Vec<f64>)> = Vec::new();

    for row in &log.rows {
        let Some((phase, operation)) = EventPhase::find(&row.event) else {
            continue;
        };

        let idx = match groups.iter().position(|(name, _, _)| *name == operation) {
            Some(idx) => idx,
            None => {
                groups.push((operation, Vec::new(), Vec::new()));
                groups.len() - 1
            }
        };

        let value = row.free_heap as f64;
        match phase {
            EventPhase::Before => groups[idx].1.push(value),
            EventPhase::After => groups[idx].2.push(value),
        }
    }

    let mut impacts: Vec<OperationImpact> = groups
        .into_iter()
        .filter_map(|(operation, before, after)| {
            let before_mean = mean(before.into_iter())?;
            let after_mean = mean(after.into_iter())?;
            Some(OperationImpact {
                operation: operation.to_string(),
                before_mean,
                after_mean,
                impact: before_mean - after_mean,
            })
        })
        .collect();

    impacts.sort_by(|a, b| {
        b.impact
            .partial_cmp(&a.impact)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.operation.cmp(&b.operation))
    });

    debug!("Computed memory impact for {} operations", impacts.len());
    impacts
}

/// Allocated vs free bytes at a single snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDistribution {
    pub allocated: u64,
    pub free: u64,
}

impl MemoryDistribution {
    pub fn total(&self) -> u64 {
        self.allocated.saturating_add(self.free)
    }

    pub fn allocated_percent(&self) -> f64 {
        percent_of(self.allocated as f64, self.total() as f64)
    }

    pub fn free_percent(&self) -> f64 {
        percent_of(self.free as f64, self.total() as f64)
    }
}

/// Snapshot at the first "After MQTT init" row, if any
pub fn memory_distribution(log: &MemoryLog) -> Option<MemoryDistribution> {
    log.first_event(FINAL_INIT_EVENT).map(|row| MemoryDistribution {
        allocated: row.total_allocated_bytes,
        free: row.free_heap,
    })
}

/// All derived tables for one log
#[derive(Debug, Clone)]
pub struct MemoryReport {
    pub gate_operations: Vec<GateOperationRecord>,
    pub init_summary: Vec<InitSummaryRow>,
    pub operation_summary: Vec<OperationSummaryRow>,
    pub fragmentation_summary: Vec<FragmentationSummaryRow>,
    pub impact: Vec<OperationImpact>,
    pub distribution: Option<MemoryDistribution>,
    pub average_fragmentation: Option<f64>,
}

/// Derive every table the renderers and exporters need
///
/// # Errors
/// * `AnalysisError::MissingEvent` - an initialization label is absent
pub fn analyze(log: &MemoryLog) -> Result<MemoryReport, AnalysisError> {
    let gate_operations = gate_operations(log);
    let operation_summary = summarize_operations(&gate_operations);

    Ok(MemoryReport {
        init_summary: summarize_initialization(log)?,
        fragmentation_summary: summarize_fragmentation(log),
        impact: memory_impact_by_operation(log),
        distribution: memory_distribution(log),
        average_fragmentation: log.average_fragmentation(),
        operation_summary,
        gate_operations,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(event: &str, free: u64, allocated: u64, largest: u64) -> MeasurementRow {
        MeasurementRow {
            timestamp: 0,
            event: event.to_string(),
            free_heap: free,
            total_allocated_bytes: allocated,
            largest_free_block: largest,
            min_free_heap: 0,
        }
    }

    #[test]
    fn test_gate_record_signed_deltas() {
        let before = row("Before open entry gate", 100, 500, 0);
        let after = row("After close entry gate", 120, 480, 0);

        let record = GateOperationRecord::from_pair(1, &before, &after);

        assert_eq!(record.memory_used, -20);
        assert_eq!(record.allocation_increase, -20);
    }

    #[test]
    fn test_summarize_operations_average_row() {
        let ops = vec![
            GateOperationRecord::from_pair(
                1,
                &row("Before open entry gate", 100, 10, 0),
                &row("After close entry gate", 90, 20, 0),
            ),
            GateOperationRecord::from_pair(
                2,
                &row("Before open entry gate", 80, 30, 0),
                &row("After close entry gate", 60, 50, 0),
            ),
        ];

        let rows = summarize_operations(&ops);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].operation, "Gate Op #1");
        assert_eq!(rows[2].operation, "Average");
        assert_eq!(rows[2].free_heap_before, 90.0);
        assert_eq!(rows[2].memory_used, 15.0);
        assert_eq!(rows[2].allocated_after, 35.0);
    }

    #[test]
    fn test_summarize_operations_empty() {
        assert!(summarize_operations(&[]).is_empty());
    }

    #[test]
    fn test_impact_drops_single_phase_operations() {
        let log = MemoryLog::new(vec![
            row("Before WiFi init", 1000, 0, 0),
            row("After WiFi init", 700, 0, 0),
            row("Before Servo init", 700, 0, 0),
            row("After Servo init", 650, 0, 0),
            row("After open exit gate", 600, 0, 0),
        ]);

        let impacts = memory_impact_by_operation(&log);

        assert_eq!(impacts.len(), 2);
        assert_eq!(impacts[0].operation, "WiFi init");
        assert_eq!(impacts[0].impact, 300.0);
        assert_eq!(impacts[1].operation, "Servo init");
    }

    #[test]
    fn test_impact_averages_repeated_phases() {
        let log = MemoryLog::new(vec![
            row("Before open entry gate", 100, 0, 0),
            row("Before open entry gate", 200, 0, 0),
            row("After open entry gate", 90, 0, 0),
        ]);

        let impacts = memory_impact_by_operation(&log);

        assert_eq!(impacts[0].before_mean, 150.0);
        assert_eq!(impacts[0].impact, 60.0);
    }

    #[test]
    fn test_distribution_percentages() {
        let dist = MemoryDistribution {
            allocated: 25,
            free: 75,
        };
        assert_eq!(dist.allocated_percent(), 25.0);
        assert_eq!(dist.free_percent(), 75.0);

        let empty = MemoryDistribution {
            allocated: 0,
            free: 0,
        };
        assert_eq!(empty.allocated_percent(), 0.0);
    }

    #[test]
    fn test_impact_groups_prefixed_labels() {
        let log = MemoryLog::new(vec![
            row("Gate: Before open entry gate", 1000, 0, 0),
            row("Before open entry gate", 900, 0, 0),
            row("Gate: After open entry gate", 700, 0, 0),
        ]);

        let impacts = memory_impact_by_operation(&log);

        assert_eq!(impacts.len(), 1);
        assert_eq!(impacts[0].operation, "open entry gate");
        assert!((impacts[0].impact - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_total_saturates() {
        let dist = MemoryDistribution {
            allocated: u64::MAX,
            free: 10,
        };

        assert_eq!(dist.total(), u64::MAX);
        assert!(dist.allocated_percent() <= 100.0);
    }

    #[test]
    fn test_fragmentation_summary_during_operations() {
        let log = MemoryLog::new(vec![
            row("Before WiFi init", 1000, 0, 1000),
            row("Before open entry gate", 400, 0, 100),
            row("After close entry gate", 600, 0, 300),
        ]);

        let rows = summarize_fragmentation(&log);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stage, "Before WiFi init");
        assert_eq!(rows[0].fragmentation_index, Some(0.0));
        assert_eq!(rows[1].stage, "During Operations");
        assert_eq!(rows[1].free_heap, 500.0);
        assert_eq!(rows[1].largest_free_block, 200.0);
        let index = rows[1].fragmentation_index.unwrap();
        assert!((index - 60.0).abs() < 1e-9);
    }
}
