//! Point-in-time export of a metrics store

use crate::histogram::Histogram;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Number of observations
    pub count: u64,
    /// Mean value
    pub mean: f64,
    /// Largest value
    pub max: u64,
}

impl HistogramSummary {
    pub(crate) fn of(histogram: &Histogram) -> Self {
        Self {
            count: histogram.count(),
            mean: histogram.mean(),
            max: histogram.max(),
        }
    }
}

/// All metrics at a point in time, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Counter values
    pub counters: BTreeMap<String, u64>,
    /// Gauge values
    pub gauges: BTreeMap<String, i64>,
    /// Histogram summaries
    pub histograms: BTreeMap<String, HistogramSummary>,
}

impl MetricsSnapshot {
    /// Pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Single-line JSON
    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Log every value at info level
    pub fn log(&self) {
        for (name, value) in &self.counters {
            tracing::info!(metric = %name, value, "counter");
        }
        for (name, summary) in &self.histograms {
            tracing::info!(
                metric = %name,
                count = summary.count,
                mean = summary.mean,
                max = summary.max,
                "histogram"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{names, Metrics};

    #[test]
    fn test_snapshot_json() {
        let metrics = Metrics::new();
        metrics.increment(names::BLOCKS_ANALYZED, 3);
        metrics.set_gauge(names::BLOCKS_IN_FLIGHT, 1);
        metrics.observe(names::REDUCE_US, 40);

        let snapshot = metrics.snapshot();
        let json = snapshot.to_json().unwrap();

        assert!(json.contains(names::BLOCKS_ANALYZED));
        assert!(json.contains(names::REDUCE_US));
        assert_eq!(snapshot.counters[names::BLOCKS_ANALYZED], 3);

        let back: super::MetricsSnapshot = serde_json::from_str(&snapshot.to_json_compact().unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }
}
