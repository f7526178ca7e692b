//! Aggregation of the measurement log into derived metrics.
//!
//! This module transforms the parsed log into:
//! - Initialization and gate-operation event sets
//! - Positionally paired gate operations
//! - Summary tables (initialization, operations, fragmentation)

pub mod events;
pub mod metrics;

// Re-export main types and functions
pub use events::{
    gate_events, init_events, is_gate_event, is_init_event, pair_gate_events, EventPhase,
};
pub use metrics::{
    analyze, average_memory_used, gate_operations, memory_distribution,
    memory_impact_by_operation, summarize_fragmentation, summarize_initialization,
    summarize_operations, FragmentationSummaryRow, GateOperationRecord, InitSummaryRow,
    MemoryDistribution, MemoryReport, OperationImpact, OperationSummaryRow,
};
