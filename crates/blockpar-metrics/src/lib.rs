//! # blockpar-metrics
//!
//! Timings and counters collected while analyzing blocks.
//!
//! A single [`Metrics`] store is shared (behind an `Arc`) by every worker of
//! a run; phase durations go into histograms in microseconds, outcomes into
//! counters. [`MetricsSnapshot`] freezes the store for JSON export.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod histogram;
mod metrics;
pub mod names;
mod snapshot;

pub use histogram::Histogram;
pub use metrics::Metrics;
pub use snapshot::{HistogramSummary, MetricsSnapshot};

/// Time a block, recording its duration in microseconds under `$name`
#[macro_export]
macro_rules! timed {
    ($metrics:expr, $name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        $metrics.observe($name, start.elapsed().as_micros() as u64);
        result
    }};
}
