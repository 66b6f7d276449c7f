//! Common infrastructure modules shared across analysis phases
//!
//! This module provides reusable infrastructure for:
//! - Frequency and metric table structures with CSV and console rendering
//! - Plotting comparative response-distribution charts

pub mod plots;
pub mod tables;

// Re-export commonly used items
pub use plots::PlotError;
pub use tables::{FrequencyTable, MetricTable};
