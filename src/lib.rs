//! Gate Heap Report
//!
//! Heap usage analysis for the ESP32 entry-gate controller.
//! Turns the device's memory measurement log into charts and
//! summary tables.
//!
//! This crate provides the core implementation for the
//! `gate-heap-report` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! gate-heap-report extract --log serial.log
//! gate-heap-report report --input memory_gate_system.csv --out-dir report
//! ```

pub mod aggregator;
pub mod charts;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
