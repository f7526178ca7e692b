//! Configuration and constants for the report.

/// Current manifest schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Default input log, relative to the working directory
pub const DEFAULT_INPUT_PATH: &str = "memory_gate_system.csv";

/// Columns the input log must carry (order is not significant)
pub const REQUIRED_COLUMNS: &[&str] = &[
    "timestamp",
    "event",
    "free_heap",
    "total_allocated_bytes",
    "largest_free_block",
    "min_free_heap",
];

// Serial capture marker printed by the firmware's print_memory_stats()
pub const MEMLOG_PREFIX: &str = "MEMLOG,";
pub const MEMLOG_FIELD_COUNT: usize = 8;

/// Firmware prints every counter as a 32-bit unsigned value
pub const MAX_COUNTER_VALUE: u64 = u32::MAX as u64;

/// Timeline annotates every event whose label contains this word
pub const INIT_ANNOTATION_MARKER: &str = "init";

// Subsystems bracketed by "Before <Name> init" / "After <Name> init"
pub const INIT_SUBSYSTEMS: &[&str] = &["WiFi", "MQTT", "Servo"];

/// Order of rows in the initialization summary
pub const INIT_SUMMARY_ORDER: &[&str] = &["WiFi", "Servo", "MQTT"];

/// Event phrases that bracket an entry-gate actuation
pub const GATE_EVENT_PHRASES: &[&str] = &[
    "Before open entry gate",
    "After open entry gate",
    "Before close entry gate",
    "After close entry gate",
];

/// Label used for the gate-operation average in the fragmentation summary
pub const DURING_OPERATIONS_LABEL: &str = "During Operations";

/// Event whose snapshot feeds the memory distribution pie
pub const FINAL_INIT_EVENT: &str = "After MQTT init";

/// Stages sampled for the fragmentation summary, in order
pub const FRAGMENTATION_STAGES: &[&str] = &["Before WiFi init", "After WiFi init", "After MQTT init"];

// Artifact stems; charts get the ".png" extension, tables ".csv"
pub const TIMELINE_CHART: &str = "memory_timeline_gate_system";
pub const IMPACT_CHART: &str = "memory_impact_by_operation_gate_system";
pub const RECOVERY_CHART: &str = "memory_recovery_pattern_gate_system";
pub const COMPOSITION_CHART: &str = "allocated_vs_free_memory_gate_system";
pub const FRAGMENTATION_CHART: &str = "memory_fragmentation_gate_system";
pub const GATE_DELTA_CHART: &str = "gate_operation_memory_delta_gate_system";
pub const INIT_TABLE_CHART: &str = "initialization_summary_table_gate_system";
pub const OPERATION_TABLE_CHART: &str = "operation_summary_table_gate_system";
pub const FRAGMENTATION_TABLE_CHART: &str = "fragmentation_summary_table_gate_system";
pub const DISTRIBUTION_PIE_CHART: &str = "memory_distribution_pie_gate_system";

pub const INIT_SUMMARY_CSV: &str = "initialization_summary_gate_system.csv";
pub const OPERATION_SUMMARY_CSV: &str = "operation_summary_gate_system.csv";
pub const FRAGMENTATION_SUMMARY_CSV: &str = "fragmentation_summary_gate_system.csv";
pub const MANIFEST_JSON: &str = "report_manifest_gate_system.json";

pub const CHART_EXTENSION: &str = "png";

// Chart geometry (pixels)
pub const CHART_WIDTH: usize = 1400;
pub const CHART_HEIGHT: usize = 800;
pub const TABLE_WIDTH: usize = 1200;

// Palette
pub const ALLOCATED_COLOR: &str = "#ff9999";
pub const FREE_COLOR: &str = "#66b3ff";
