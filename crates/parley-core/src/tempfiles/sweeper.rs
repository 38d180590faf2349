//! Periodic sweep task driven by the host's lifecycle

use super::TempFileRegistry;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Background sweeper settings
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Time between sweeps
    pub interval: Duration,
    /// Delete every pending file when the sweeper is cancelled
    pub sweep_on_shutdown: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            sweep_on_shutdown: true,
        }
    }
}

impl SweeperConfig {
    /// Set the sweep interval
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set whether cancellation triggers a final sweep
    #[must_use]
    pub fn with_sweep_on_shutdown(mut self, enabled: bool) -> Self {
        self.sweep_on_shutdown = enabled;
        self
    }
}

/// Sweep `registry` every `config.interval` until `shutdown` is cancelled
pub fn spawn_sweeper(
    registry: TempFileRegistry,
    config: SweeperConfig,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // tokio intervals reject a zero period
        let period = config.interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Temp file sweeper started (interval: {}s)",
            config.interval.as_secs()
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    if config.sweep_on_shutdown {
                        registry.sweep_all().await;
                    }
                    debug!("Temp file sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    registry.sweep().await;
                }
            }
        }
    })
}
