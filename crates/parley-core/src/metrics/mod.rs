//! Performance metrics for provider calls
//!
//! [`PerformanceMetrics`] owns one entry per operation key. Samples arrive
//! either from a [`Tracker`] when it completes or directly through
//! [`PerformanceMetrics::track`]. Averages are computed on query from the
//! running total, so they always cover every sample ever recorded; only a
//! bounded window of the most recent samples is kept for inspection.

mod export;
mod tracker;

pub use export::MetricsSnapshot;
pub use tracker::Tracker;

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Default number of recent samples retained per key
pub const DEFAULT_SAMPLE_WINDOW: usize = 1_000;

#[derive(Debug, Default)]
struct KeyStats {
    count: u64,
    total: Duration,
    recent: VecDeque<Duration>,
}

/// Metrics entry for a single key. Trackers hold an `Arc` to the entry they
/// report into; the aggregator's map is the owner.
#[derive(Debug)]
pub(crate) struct MetricsEntry {
    window: usize,
    stats: Mutex<KeyStats>,
}

impl MetricsEntry {
    fn new(window: usize) -> Self {
        Self {
            window,
            stats: Mutex::new(KeyStats::default()),
        }
    }

    pub(crate) fn record(&self, elapsed: Duration) {
        let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.count += 1;
        stats.total += elapsed;
        if self.window > 0 {
            if stats.recent.len() == self.window {
                stats.recent.pop_front();
            }
            stats.recent.push_back(elapsed);
        }
    }

    fn count(&self) -> u64 {
        self.stats.lock().unwrap_or_else(|e| e.into_inner()).count
    }

    fn totals(&self) -> (u64, Duration) {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        (stats.count, stats.total)
    }

    fn recent(&self) -> Vec<Duration> {
        let stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
        stats.recent.iter().copied().collect()
    }
}

fn mean(count: u64, total: Duration) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    let nanos = total.as_nanos() / u128::from(count);
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Aggregator for per-key operation timings
#[derive(Debug, Clone)]
pub struct PerformanceMetrics {
    entries: Arc<RwLock<HashMap<String, Arc<MetricsEntry>>>>,
    sample_window: usize,
}

impl Default for PerformanceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceMetrics {
    /// Create an empty aggregator with the default sample window
    #[must_use]
    pub fn new() -> Self {
        Self::with_sample_window(DEFAULT_SAMPLE_WINDOW)
    }

    /// Create an empty aggregator retaining `window` recent samples per key
    #[must_use]
    pub fn with_sample_window(window: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            sample_window: window,
        }
    }

    /// Get or create the entry for `key`
    fn entry(&self, key: &str) -> Arc<MetricsEntry> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get(key) {
            return entry.clone();
        }
        drop(entries);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(MetricsEntry::new(self.sample_window)))
            .clone()
    }

    fn existing(&self, key: &str) -> Option<Arc<MetricsEntry>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Start timing an operation under `key`
    #[must_use = "the sample is only recorded when the tracker is completed with `done`"]
    pub fn start(&self, key: &str) -> Tracker {
        Tracker::start(key.to_string(), self.entry(key))
    }

    /// Record an externally measured duration under `key`
    pub fn track(&self, key: &str, elapsed: Duration) {
        self.entry(key).record(elapsed);
    }

    /// Run `future` inside a tracker for `key`
    pub async fn time<F>(&self, key: &str, future: F) -> F::Output
    where
        F: Future,
    {
        let mut tracker = self.start(key);
        let output = future.await;
        tracker.done();
        output
    }

    /// Keys with at least one recorded sample, in no particular order
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .filter(|(_, entry)| entry.count() > 0)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Mean of every sample recorded for `key`, or zero if there are none
    #[must_use]
    pub fn average(&self, key: &str) -> Duration {
        self.existing(key)
            .map(|entry| {
                let (count, total) = entry.totals();
                mean(count, total)
            })
            .unwrap_or(Duration::ZERO)
    }

    /// Number of samples recorded for `key`
    #[must_use]
    pub fn sample_count(&self, key: &str) -> u64 {
        self.existing(key).map(|entry| entry.count()).unwrap_or(0)
    }

    /// The most recent samples for `key`, oldest first
    #[must_use]
    pub fn recent_samples(&self, key: &str) -> Vec<Duration> {
        self.existing(key)
            .map(|entry| entry.recent())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests;
