//! Chart generation as hand-built SVG, rasterized to PNG by `output::png`.
//!
//! This module converts the measurement log and derived tables into the ten
//! report images: six plots, three summary tables and one pie chart.

pub mod canvas;
pub mod plots;
pub mod tables;

use crate::utils::config::{CHART_HEIGHT, CHART_WIDTH};

// Re-export main types
pub use plots::{
    composition_chart, distribution_pie_chart, fragmentation_chart, gate_delta_chart,
    impact_chart, recovery_chart, timeline_chart,
};
pub use tables::{fragmentation_table_chart, init_table_chart, operation_table_chart};

/// Chart configuration
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
        }
    }
}

impl ChartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}
