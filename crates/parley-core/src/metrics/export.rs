//! Snapshots and Prometheus text export

use super::{mean, PerformanceMetrics};
use serde::Serialize;
use std::fmt::Write;
use std::time::Duration;

/// Point-in-time view of one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Operation key
    pub key: String,
    /// Number of samples
    pub count: u64,
    /// Mean duration
    pub average: Duration,
    /// Sum of all samples
    pub total: Duration,
}

impl MetricsSnapshot {
    /// Mean duration in milliseconds
    #[must_use]
    pub fn average_ms(&self) -> f64 {
        self.average.as_secs_f64() * 1000.0
    }
}

impl PerformanceMetrics {
    /// Snapshot every key with samples, sorted by key
    #[must_use]
    pub fn snapshot(&self) -> Vec<MetricsSnapshot> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut snapshots: Vec<_> = entries
            .iter()
            .filter_map(|(key, entry)| {
                let (count, total) = entry.totals();
                (count > 0).then(|| MetricsSnapshot {
                    key: key.clone(),
                    count,
                    average: mean(count, total),
                    total,
                })
            })
            .collect();
        snapshots.sort_by(|a, b| a.key.cmp(&b.key));
        snapshots
    }

    /// Export metrics in Prometheus format, one labeled series per key
    #[must_use]
    pub fn export_prometheus(&self, prefix: &str) -> String {
        let snapshots = self.snapshot();
        let mut output = String::new();

        let _ = writeln!(output, "# TYPE {}_seconds summary", prefix);
        for s in &snapshots {
            let label = escape_label(&s.key);
            let _ = writeln!(
                output,
                "{}_seconds_sum{{key=\"{}\"}} {}",
                prefix,
                label,
                s.total.as_secs_f64()
            );
            let _ = writeln!(
                output,
                "{}_seconds_count{{key=\"{}\"}} {}",
                prefix, label, s.count
            );
        }

        let _ = writeln!(output, "# TYPE {}_average_seconds gauge", prefix);
        for s in &snapshots {
            let _ = writeln!(
                output,
                "{}_average_seconds{{key=\"{}\"}} {}",
                prefix,
                escape_label(&s.key),
                s.average.as_secs_f64()
            );
        }

        output
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
