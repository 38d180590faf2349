//! Pausable timing handle for a single operation

use super::MetricsEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerState {
    Running { since: Instant },
    Paused,
    Done,
}

/// Times one operation instance and reports it on [`Tracker::done`].
///
/// Paused intervals are excluded from the reported duration. Out-of-order
/// calls (resume while running, anything after `done`) are logged and
/// ignored. A tracker dropped before `done` records nothing.
#[derive(Debug)]
pub struct Tracker {
    key: String,
    entry: Arc<MetricsEntry>,
    accumulated: Duration,
    state: TrackerState,
}

impl Tracker {
    pub(crate) fn start(key: String, entry: Arc<MetricsEntry>) -> Self {
        Self {
            key,
            entry,
            accumulated: Duration::ZERO,
            state: TrackerState::Running {
                since: Instant::now(),
            },
        }
    }

    /// Metric key this tracker reports into
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether time is currently being accumulated
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.state, TrackerState::Running { .. })
    }

    /// Whether the tracker is paused
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == TrackerState::Paused
    }

    /// Whether the tracker has reported its sample
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == TrackerState::Done
    }

    /// Time accumulated so far, excluding pauses
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match self.state {
            TrackerState::Running { since } => self.accumulated + since.elapsed(),
            TrackerState::Paused | TrackerState::Done => self.accumulated,
        }
    }

    /// Stop accumulating time until [`Tracker::resume`]
    pub fn pause(&mut self) {
        match self.state {
            TrackerState::Running { since } => {
                self.accumulated += since.elapsed();
                self.state = TrackerState::Paused;
            }
            TrackerState::Paused => debug!(key = %self.key, "Tracker already paused"),
            TrackerState::Done => warn!(key = %self.key, "Pause called on completed tracker"),
        }
    }

    /// Continue accumulating time after a pause
    pub fn resume(&mut self) {
        match self.state {
            TrackerState::Paused => {
                self.state = TrackerState::Running {
                    since: Instant::now(),
                };
            }
            TrackerState::Running { .. } => {
                warn!(key = %self.key, "Resume called on running tracker")
            }
            TrackerState::Done => warn!(key = %self.key, "Resume called on completed tracker"),
        }
    }

    /// Finish timing and record the sample.
    ///
    /// Returns the reported duration, or `None` if the tracker was already done.
    pub fn done(&mut self) -> Option<Duration> {
        if self.is_done() {
            warn!(key = %self.key, "Done called on completed tracker");
            return None;
        }

        let elapsed = self.elapsed();
        self.accumulated = elapsed;
        self.state = TrackerState::Done;
        self.entry.record(elapsed);
        Some(elapsed)
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if !self.is_done() {
            debug!(
                key = %self.key,
                elapsed_ms = self.elapsed().as_millis() as u64,
                "Tracker dropped before completion, sample discarded"
            );
        }
    }
}
