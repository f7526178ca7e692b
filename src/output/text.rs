//! Plain-text summary for the terminal.

use crate::aggregator::MemoryReport;

/// Create a boxed text summary of the derived tables
pub fn generate_text_summary(report: &MemoryReport, row_count: usize) -> String {
    let mut lines = Vec::new();

    lines.push(format!("  HEAP REPORT ({} measurements)", row_count));
    lines.push("  ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━┳━━━━━━━━━━┓".to_string());
    lines.push(format!(
        "  ┃ {:<25} ┃ {:>12} ┃ {:>12} ┃ {:>12} ┃ {:>8} ┃",
        "Initialization", "BEFORE", "AFTER", "DELTA", "%"
    ));
    lines.push("  ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━╋━━━━━━━━━━┫".to_string());

    for row in &report.init_summary {
        lines.push(format!(
            "  ┃ {:<25} ┃ {:>12} ┃ {:>12} ┃ {:>12} ┃ {:>7.2}% ┃",
            row.operation, row.before, row.after, row.delta, row.percent_of_initial
        ));
    }

    lines.push("  ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━┻━━━━━━━━━━┛".to_string());
    lines.push(String::new());

    match report.operation_summary.last() {
        Some(average) => {
            lines.push(format!(
                "  Gate operations: {} | Avg memory used: {:.2} bytes | Avg free before/after: {:.0} / {:.0}",
                report.gate_operations.len(),
                average.memory_used,
                average.free_heap_before,
                average.free_heap_after
            ));
        }
        None => lines.push("  Gate operations: none recorded".to_string()),
    }

    match report.average_fragmentation {
        Some(avg) => lines.push(format!("  Average fragmentation: {:.2}%", avg)),
        None => lines.push("  Average fragmentation: n/a".to_string()),
    }

    if let Some(top) = report.impact.first() {
        lines.push(format!(
            "  Largest impact: {} ({:.0} bytes)",
            top.operation, top.impact
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{InitSummaryRow, MemoryReport};

    #[test]
    fn test_summary_without_operations() {
        let report = MemoryReport {
            gate_operations: Vec::new(),
            init_summary: vec![InitSummaryRow {
                operation: "WiFi Init".to_string(),
                before: 100000,
                after: 95000,
                delta: 5000,
                percent_of_initial: 5.0,
            }],
            operation_summary: Vec::new(),
            fragmentation_summary: Vec::new(),
            impact: Vec::new(),
            distribution: None,
            average_fragmentation: None,
        };

        let text = generate_text_summary(&report, 2);

        assert!(text.contains("WiFi Init"));
        assert!(text.contains("5.00%"));
        assert!(text.contains("Gate operations: none recorded"));
        assert!(text.contains("Average fragmentation: n/a"));
    }
}
