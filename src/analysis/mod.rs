//! Domain-specific analysis modules
//!
//! This module contains the statistical core of the pipeline:
//! - Frequency distribution analysis and cross-year aggregation
//! - Percent-change, deviation scoring, and outlier detection

pub mod change;
pub mod frequency;

// Re-export analysis functions for convenience
pub use change::{deviation, find_outliers, percent_change, OutlierRecord};
pub use frequency::{aggregate_distributions, aggregate_frequencies, analyze_question};
