//! Shared metrics store

use crate::histogram::Histogram;
use crate::snapshot::{HistogramSummary, MetricsSnapshot};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

/// Thread-safe store of named histograms, counters and gauges.
///
/// Metrics are created on first use. Lookups take the read lock; the write
/// lock is only taken to insert a new name.
#[derive(Debug, Default)]
pub struct Metrics {
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
    counters: RwLock<HashMap<String, Arc<AtomicU64>>>,
    gauges: RwLock<HashMap<String, Arc<AtomicI64>>>,
}

fn get_or_insert<T>(
    map: &RwLock<HashMap<String, Arc<T>>>,
    name: &str,
    make: impl FnOnce() -> T,
) -> Arc<T> {
    if let Some(existing) = map.read().get(name) {
        return Arc::clone(existing);
    }
    let mut map = map.write();
    Arc::clone(map.entry(name.to_string()).or_insert_with(|| Arc::new(make())))
}

impl Metrics {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a histogram observation
    pub fn observe(&self, name: &str, value: u64) {
        get_or_insert(&self.histograms, name, Histogram::new).observe(value);
    }

    /// Add `delta` to a counter
    pub fn increment(&self, name: &str, delta: u64) {
        get_or_insert(&self.counters, name, || AtomicU64::new(0))
            .fetch_add(delta, Ordering::Relaxed);
    }

    /// Set a gauge
    pub fn set_gauge(&self, name: &str, value: i64) {
        get_or_insert(&self.gauges, name, || AtomicI64::new(0)).store(value, Ordering::Relaxed);
    }

    /// Add `delta` (possibly negative) to a gauge
    pub fn add_gauge(&self, name: &str, delta: i64) {
        get_or_insert(&self.gauges, name, || AtomicI64::new(0))
            .fetch_add(delta, Ordering::Relaxed);
    }

    /// Counter value
    pub fn counter(&self, name: &str) -> Option<u64> {
        self.counters.read().get(name).map(|c| c.load(Ordering::Relaxed))
    }

    /// Gauge value
    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.read().get(name).map(|g| g.load(Ordering::Relaxed))
    }

    /// Histogram summary
    pub fn histogram(&self, name: &str) -> Option<HistogramSummary> {
        self.histograms.read().get(name).map(|h| HistogramSummary::of(h))
    }

    /// Freeze the current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
                .collect(),
            gauges: self
                .gauges
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
                .collect(),
            histograms: self
                .histograms
                .read()
                .iter()
                .map(|(k, h)| (k.clone(), HistogramSummary::of(h)))
                .collect(),
        }
    }
}
