//! Line, area, bar and pie charts of the memory log.
//!
//! Every function is a pure function of the log or the derived tables and
//! returns a complete SVG document.

use super::canvas::{
    format_tick, padded_range, Axes, Grid, LegendEntry, LegendMark, Stroke, SvgCanvas, TextStyle,
    XTicks,
};
use super::ChartConfig;
use crate::aggregator::{
    average_memory_used, GateOperationRecord, MemoryDistribution, OperationImpact,
};
use crate::parser::MemoryLog;
use crate::utils::config::{ALLOCATED_COLOR, FREE_COLOR, INIT_ANNOTATION_MARKER};
use crate::utils::error::ChartError;
use log::debug;

const BLUE: &str = "#1f77b4";
const ORANGE: &str = "#ff7f0e";
const GREEN: &str = "green";
const RED: &str = "red";
const PURPLE: &str = "purple";
const SKY_BLUE: &str = "skyblue";

fn require_rows(log: &MemoryLog, chart: &str) -> Result<(), ChartError> {
    if log.is_empty() {
        Err(ChartError::EmptySeries(chart.to_string()))
    } else {
        Ok(())
    }
}

/// Free heap over time with init annotations and the low-water mark
///
/// **Public** - chart 1
pub fn timeline_chart(log: &MemoryLog, config: &ChartConfig) -> Result<String, ChartError> {
    require_rows(log, "memory timeline")?;

    let min_free_heap = log.rows[0].min_free_heap as f64;
    let x_range = padded_range(log.rows.iter().map(|r| r.timestamp as f64));
    let y_range = padded_range(
        log.rows
            .iter()
            .map(|r| r.free_heap as f64)
            .chain([min_free_heap * 0.98, min_free_heap * 1.03]),
    );

    let mut canvas = SvgCanvas::new(config.width, config.height);
    canvas.title("Memory Usage Timeline for Gate System");
    let axes = Axes::new(&canvas, x_range, y_range, 70.0);
    axes.draw(&mut canvas, "Time (ms)", "Free Heap (bytes)", XTicks::Numeric, Grid::Both);

    let points: Vec<(f64, f64)> = log
        .rows
        .iter()
        .map(|r| axes.point(r.timestamp as f64, r.free_heap as f64))
        .collect();
    canvas.polyline(&points, Stroke::solid(BLUE, 2.0));
    for (x, y) in &points {
        canvas.circle(*x, *y, 4.0, BLUE);
    }

    // Any label mentioning init is annotated, not only the tracked subsystems
    for row in log.rows.iter().filter(|r| r.event.contains(INIT_ANNOTATION_MARKER)) {
        let (x, y) = axes.point(row.timestamp as f64, row.free_heap as f64);
        canvas.text(
            x,
            y - 10.0,
            &row.event,
            TextStyle::sized(10.0).anchor("start").rotate(-45.0),
        );
    }

    let min_y = axes.py(min_free_heap);
    canvas.line(axes.left, min_y, axes.right(), min_y, Stroke::dashed(RED, 1.5).opacity(0.7));
    let (label_x, label_y) = axes.point(log.max_timestamp() as f64 * 0.9, min_free_heap * 1.01);
    canvas.text(
        label_x,
        label_y,
        &format!("Min Free Heap: {} bytes", log.rows[0].min_free_heap),
        TextStyle::sized(12.0).fill(RED),
    );

    Ok(canvas.finish())
}

/// Mean free-heap drop per operation, largest first
///
/// **Public** - chart 2 (skipped by the report when `impacts` is empty)
pub fn impact_chart(impacts: &[OperationImpact], config: &ChartConfig) -> Result<String, ChartError> {
    if impacts.is_empty() {
        return Err(ChartError::EmptySeries("memory impact".to_string()));
    }

    let labels: Vec<String> = impacts.iter().map(|i| i.operation.clone()).collect();
    let values: Vec<f64> = impacts.iter().map(|i| i.impact).collect();

    let mut canvas = SvgCanvas::new(config.width, config.height);
    canvas.title("Memory Impact by Operation for Gate System");
    let axes = Axes::new(&canvas, (0.4, impacts.len() as f64 + 0.6), bar_range(&values), 170.0);
    axes.draw(
        &mut canvas,
        "Operation",
        "Memory Impact (bytes)",
        XTicks::Categories {
            labels: &labels,
            rotate: -45.0,
        },
        Grid::YOnly,
    );

    draw_bars(&mut canvas, &axes, &values, SKY_BLUE, 12.0);
    Ok(canvas.finish())
}

/// Free heap before and after each gate operation
///
/// **Public** - chart 3
pub fn recovery_chart(operations: &[GateOperationRecord], config: &ChartConfig) -> String {
    let x_range = padded_range(operations.iter().map(|op| op.operation_number as f64));
    let y_range = padded_range(
        operations
            .iter()
            .flat_map(|op| [op.free_heap_before as f64, op.free_heap_after as f64]),
    );

    let mut canvas = SvgCanvas::new(config.width, config.height);
    canvas.title("Memory Recovery Pattern Across Gate Operations");
    let axes = Axes::new(&canvas, x_range, y_range, 70.0);
    axes.draw(&mut canvas, "Operation Number", "Free Heap (bytes)", XTicks::Numeric, Grid::Both);

    let before: Vec<(f64, f64)> = operations
        .iter()
        .map(|op| axes.point(op.operation_number as f64, op.free_heap_before as f64))
        .collect();
    let after: Vec<(f64, f64)> = operations
        .iter()
        .map(|op| axes.point(op.operation_number as f64, op.free_heap_after as f64))
        .collect();

    canvas.polyline(&before, Stroke::solid(GREEN, 2.0));
    for (x, y) in &before {
        canvas.circle(*x, *y, 4.5, GREEN);
    }
    canvas.polyline(&after, Stroke::dashed(RED, 2.0));
    for (x, y) in &after {
        canvas.cross(*x, *y, 5.0, RED);
    }

    canvas.legend(
        axes.right() - 10.0,
        axes.top + 10.0,
        &[
            LegendEntry {
                label: "Before Operation",
                color: GREEN,
                mark: LegendMark::Line { dashed: false },
            },
            LegendEntry {
                label: "After Operation",
                color: RED,
                mark: LegendMark::Line { dashed: true },
            },
        ],
    );

    debug!("Recovery chart covers {} operations", operations.len());
    canvas.finish()
}

/// Stacked allocated + free bytes over time
///
/// **Public** - chart 4
pub fn composition_chart(log: &MemoryLog, config: &ChartConfig) -> Result<String, ChartError> {
    require_rows(log, "memory composition")?;

    let x_range = padded_range(log.rows.iter().map(|r| r.timestamp as f64));
    let top = log
        .rows
        .iter()
        .map(|r| r.total_allocated_bytes as f64 + r.free_heap as f64)
        .fold(0.0, f64::max);
    let y_range = (0.0, if top > 0.0 { top * 1.05 } else { 1.0 });

    let mut canvas = SvgCanvas::new(config.width, config.height);
    canvas.title("Memory Composition Over Time in Gate System");
    let axes = Axes::new(&canvas, x_range, y_range, 70.0);

    let baseline: Vec<(f64, f64)> = log
        .rows
        .iter()
        .map(|r| axes.point(r.timestamp as f64, 0.0))
        .collect();
    let allocated: Vec<(f64, f64)> = log
        .rows
        .iter()
        .map(|r| axes.point(r.timestamp as f64, r.total_allocated_bytes as f64))
        .collect();
    let stacked: Vec<(f64, f64)> = log
        .rows
        .iter()
        .map(|r| {
            axes.point(
                r.timestamp as f64,
                r.total_allocated_bytes as f64 + r.free_heap as f64,
            )
        })
        .collect();

    canvas.polygon(&band(&baseline, &allocated), ALLOCATED_COLOR, 1.0);
    canvas.polygon(&band(&allocated, &stacked), FREE_COLOR, 1.0);

    axes.draw(&mut canvas, "Time (ms)", "Memory (bytes)", XTicks::Numeric, Grid::Both);
    canvas.legend(
        axes.right() - 10.0,
        axes.top + 10.0,
        &[
            LegendEntry {
                label: "Allocated Memory",
                color: ALLOCATED_COLOR,
                mark: LegendMark::Patch { opacity: 1.0 },
            },
            LegendEntry {
                label: "Free Memory",
                color: FREE_COLOR,
                mark: LegendMark::Patch { opacity: 1.0 },
            },
        ],
    );

    Ok(canvas.finish())
}

/// Free heap vs largest free block with the gap shaded
///
/// **Public** - chart 5
pub fn fragmentation_chart(
    log: &MemoryLog,
    average_fragmentation: Option<f64>,
    config: &ChartConfig,
) -> Result<String, ChartError> {
    require_rows(log, "memory fragmentation")?;

    let x_range = padded_range(log.rows.iter().map(|r| r.timestamp as f64));
    let y_range = padded_range(
        log.rows
            .iter()
            .flat_map(|r| [r.free_heap as f64, r.largest_free_block as f64]),
    );

    let mut canvas = SvgCanvas::new(config.width, config.height);
    canvas.title("Memory Fragmentation Analysis for Gate System");
    let axes = Axes::new(&canvas, x_range, y_range, 110.0);
    axes.draw(&mut canvas, "Time (ms)", "Memory (bytes)", XTicks::Numeric, Grid::Both);

    let free: Vec<(f64, f64)> = log
        .rows
        .iter()
        .map(|r| axes.point(r.timestamp as f64, r.free_heap as f64))
        .collect();
    let largest: Vec<(f64, f64)> = log
        .rows
        .iter()
        .map(|r| axes.point(r.timestamp as f64, r.largest_free_block as f64))
        .collect();

    canvas.polygon(&band(&largest, &free), RED, 0.3);
    canvas.polyline(&free, Stroke::solid(BLUE, 2.0));
    canvas.polyline(&largest, Stroke::solid(ORANGE, 2.0));

    canvas.legend(
        axes.right() - 10.0,
        axes.top + 10.0,
        &[
            LegendEntry {
                label: "Total Free Bytes",
                color: BLUE,
                mark: LegendMark::Line { dashed: false },
            },
            LegendEntry {
                label: "Largest Free Block",
                color: ORANGE,
                mark: LegendMark::Line { dashed: false },
            },
            LegendEntry {
                label: "Fragmentation",
                color: RED,
                mark: LegendMark::Patch { opacity: 0.3 },
            },
        ],
    );

    let caption = match average_fragmentation {
        Some(avg) => format!("Average Fragmentation: {:.2}%", avg),
        None => "Average Fragmentation: n/a".to_string(),
    };
    let caption_x = canvas.width() / 2.0;
    let caption_y = canvas.height() - 50.0;
    canvas.boxed_text(caption_x, caption_y, &caption, 15.0);

    Ok(canvas.finish())
}

/// Free heap consumed by each gate operation with the mean marked
///
/// **Public** - chart 6
pub fn gate_delta_chart(operations: &[GateOperationRecord], config: &ChartConfig) -> String {
    let values: Vec<f64> = operations.iter().map(|op| op.memory_used as f64).collect();
    let labels: Vec<String> = operations
        .iter()
        .map(|op| op.operation_number.to_string())
        .collect();
    let average = average_memory_used(operations);

    let mut canvas = SvgCanvas::new(config.width, config.height);
    canvas.title("Memory Consumption per Gate Operation");
    let axes = Axes::new(
        &canvas,
        (0.4, operations.len() as f64 + 0.6),
        bar_range(&values),
        70.0,
    );
    axes.draw(
        &mut canvas,
        "Operation Number",
        "Memory Used (bytes)",
        XTicks::Categories {
            labels: &labels,
            rotate: 0.0,
        },
        Grid::YOnly,
    );

    draw_bars(&mut canvas, &axes, &values, PURPLE, 11.0);

    if let Some(avg) = average {
        let y = axes.py(avg);
        canvas.line(axes.left, y, axes.right(), y, Stroke::dashed(RED, 1.5));
        let label_x = axes.px(operations.len() as f64 * 0.8);
        let label_y = axes.py(avg * 1.05);
        canvas.text(
            label_x,
            label_y,
            &format!("Average: {:.2} bytes", avg),
            TextStyle::sized(12.0).fill(RED),
        );
    }

    canvas.finish()
}

/// Allocated vs free share at the end of initialization
///
/// **Public** - chart 10
pub fn distribution_pie_chart(
    distribution: &MemoryDistribution,
    config: &ChartConfig,
) -> Result<String, ChartError> {
    if distribution.total() == 0 {
        return Err(ChartError::EmptySeries("memory distribution".to_string()));
    }

    let size = config.width.min(config.height);
    let mut canvas = SvgCanvas::new(size, size);
    canvas.title("Memory Distribution After System Initialization for Gate System");

    let cx = canvas.width() / 2.0;
    let cy = canvas.height() / 2.0 + 20.0;
    let radius = canvas.width() * 0.3;

    let slices = [
        (
            "Allocated Memory",
            distribution.allocated_percent(),
            ALLOCATED_COLOR,
            0.1,
        ),
        ("Free Memory", distribution.free_percent(), FREE_COLOR, 0.0),
    ];

    // Start at 12 o'clock and run counter-clockwise
    let mut start = 90.0;
    for (label, percent, color, explode) in slices {
        let sweep = percent / 100.0 * 360.0;
        let mid = (start + sweep / 2.0_f64).to_radians();
        let offset = explode * radius;
        let (sx, sy) = (cx + offset * mid.cos(), cy - offset * mid.sin());

        canvas.wedge(sx, sy, radius, start, start + sweep, color);

        let (lx, ly) = (sx + radius * 1.12 * mid.cos(), sy - radius * 1.12 * mid.sin());
        let anchor = if mid.cos() >= 0.0 { "start" } else { "end" };
        canvas.text(lx, ly, label, TextStyle::sized(14.0).anchor(anchor));

        let (px, py) = (sx + radius * 0.6 * mid.cos(), sy - radius * 0.6 * mid.sin());
        canvas.text(px, py + 5.0, &format!("{:.1}%", percent), TextStyle::sized(14.0));

        start += sweep;
    }

    Ok(canvas.finish())
}

/// Y range for a bar chart: always includes zero, headroom for value labels
fn bar_range(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(0.0, f64::min);
    let hi = values.iter().copied().fold(0.0, f64::max);
    if hi - lo < f64::EPSILON {
        return (lo, lo + 1.0);
    }
    let pad = (hi - lo) * 0.1;
    (if lo < 0.0 { lo - pad } else { 0.0 }, hi + pad)
}

/// One bar per value at x = 1..=n, labelled with its integer value
fn draw_bars(canvas: &mut SvgCanvas, axes: &Axes, values: &[f64], color: &str, label_size: f64) {
    let slot = axes.px(2.0) - axes.px(1.0);
    let bar_w = slot * 0.8;
    let zero = axes.py(0.0);

    for (i, value) in values.iter().enumerate() {
        let x = axes.px((i + 1) as f64);
        let y = axes.py(*value);
        canvas.rect(x - bar_w / 2.0, y.min(zero), bar_w, (zero - y).abs(), color, 1.0);

        let label_y = if *value >= 0.0 { y - 6.0 } else { y + label_size + 4.0 };
        canvas.text(
            x,
            label_y,
            &format_tick(value.trunc()),
            TextStyle::sized(label_size),
        );
    }
}

/// Closed polygon between a lower and an upper line sharing x positions
fn band(lower: &[(f64, f64)], upper: &[(f64, f64)]) -> Vec<(f64, f64)> {
    upper
        .iter()
        .copied()
        .chain(lower.iter().rev().copied())
        .collect()
}
