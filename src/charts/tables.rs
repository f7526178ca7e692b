//! Summary tables rendered as images.
//!
//! Numeric cells are rounded to two decimals; integral values print without
//! a fractional part.

use super::canvas::{estimate_text_width, Stroke, SvgCanvas, TextStyle};
use crate::aggregator::{FragmentationSummaryRow, InitSummaryRow, OperationSummaryRow};
use crate::utils::config::TABLE_WIDTH;

const HEADER_FILL: &str = "#e8eef7";
const ROW_HEIGHT: f64 = 36.0;
const FONT_SIZE: f64 = 13.0;

/// Render a titled grid of cells
///
/// **Public** - shared by the three summary tables
pub fn render_table(title: &str, headers: &[&str], rows: &[Vec<String>]) -> String {
    let columns = headers.len().max(1);

    // Widen the image if the longest cell would not fit its column
    let widest_cell = headers
        .iter()
        .map(|h| h.to_string())
        .chain(rows.iter().flatten().cloned())
        .map(|cell| estimate_text_width(&cell, FONT_SIZE) + 24.0)
        .fold(0.0, f64::max);
    let table_width = (TABLE_WIDTH as f64 - 80.0).max(widest_cell * columns as f64);
    let width = (table_width + 80.0).ceil() as usize;
    let height = (120.0 + ROW_HEIGHT * (rows.len() + 1) as f64).ceil() as usize;

    let mut canvas = SvgCanvas::new(width, height);
    canvas.title(title);

    let left = 40.0;
    let top = 70.0;
    let col_w = table_width / columns as f64;
    let border = Stroke::solid("#444444", 1.0);

    for (c, header) in headers.iter().enumerate() {
        let x = left + col_w * c as f64;
        canvas.outlined_rect(x, top, col_w, ROW_HEIGHT, HEADER_FILL, border);
        canvas.text(
            x + col_w / 2.0,
            top + ROW_HEIGHT / 2.0 + FONT_SIZE * 0.35,
            header,
            TextStyle::sized(FONT_SIZE).bold(),
        );
    }

    for (r, row) in rows.iter().enumerate() {
        let y = top + ROW_HEIGHT * (r + 1) as f64;
        for c in 0..columns {
            let x = left + col_w * c as f64;
            canvas.outlined_rect(x, y, col_w, ROW_HEIGHT, "white", border);
            if let Some(cell) = row.get(c) {
                canvas.text(
                    x + col_w / 2.0,
                    y + ROW_HEIGHT / 2.0 + FONT_SIZE * 0.35,
                    cell,
                    TextStyle::sized(FONT_SIZE),
                );
            }
        }
    }

    canvas.finish()
}

/// Format a table cell to two decimals
pub fn format_cell(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.2}", rounded)
    }
}

/// **Public** - chart 7
pub fn init_table_chart(rows: &[InitSummaryRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.operation.clone(),
                row.before.to_string(),
                row.after.to_string(),
                row.delta.to_string(),
                format_cell(row.percent_of_initial),
            ]
        })
        .collect();

    render_table(
        "System Initialization Memory Impact for Gate System",
        InitSummaryRow::HEADERS,
        &cells,
    )
}

/// **Public** - chart 8
pub fn operation_table_chart(rows: &[OperationSummaryRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.operation.clone(),
                format_cell(row.free_heap_before),
                format_cell(row.free_heap_after),
                format_cell(row.memory_used),
                format_cell(row.allocated_before),
                format_cell(row.allocated_after),
            ]
        })
        .collect();

    render_table(
        "Gate Operation Memory Analysis",
        OperationSummaryRow::HEADERS,
        &cells,
    )
}

/// **Public** - chart 9
pub fn fragmentation_table_chart(rows: &[FragmentationSummaryRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.stage.clone(),
                format_cell(row.free_heap),
                format_cell(row.largest_free_block),
                row.fragmentation_index
                    .map(format_cell)
                    .unwrap_or_else(|| "n/a".to_string()),
            ]
        })
        .collect();

    render_table(
        "Memory Fragmentation Analysis for Gate System",
        FragmentationSummaryRow::HEADERS,
        &cells,
    )
}
