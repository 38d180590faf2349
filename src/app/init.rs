//! Startup and shutdown of the long-lived components

use super::config::AppConfig;
use anyhow::{Context, Result};
use parley_core::{
    spawn_sweeper, CapabilityRegistry, PerformanceMetrics, Services, SweeperConfig,
    TempFileRegistry,
};
use parley_providers::register_builtins_with_config;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Running application state
pub struct App {
    pub services: Services,
    shutdown: CancellationToken,
    sweeper: Option<JoinHandle<()>>,
    sweep_on_shutdown: bool,
}

impl App {
    /// Register providers, freeze the registry, validate the selection and
    /// start the background sweeper
    pub fn build(config: &AppConfig) -> Result<Self> {
        let mut builder = CapabilityRegistry::builder();
        register_builtins_with_config(&mut builder, &config.builtins)
            .context("Failed to register built-in providers")?;
        let registry = Arc::new(builder.build());

        let scratch_dir = config.temp_files.scratch_dir();
        debug!(path = %scratch_dir.display(), "Scratch directory");
        let temp_files = TempFileRegistry::new(scratch_dir);

        let services = Services::new(
            registry,
            PerformanceMetrics::with_sample_window(config.metrics.sample_window),
            temp_files.clone(),
            config.providers.clone(),
        );
        services
            .validate()
            .context("Invalid provider selection")?;

        let shutdown = CancellationToken::new();
        let sweeper = config.temp_files.sweep_interval().map(|interval| {
            spawn_sweeper(
                temp_files,
                SweeperConfig::default()
                    .with_interval(interval)
                    .with_sweep_on_shutdown(config.temp_files.sweep_on_shutdown),
                shutdown.child_token(),
            )
        });

        info!("Parley ready");
        Ok(Self {
            services,
            shutdown,
            sweeper,
            sweep_on_shutdown: config.temp_files.sweep_on_shutdown,
        })
    }

    /// Stop background work and run the shutdown sweep
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        match self.sweeper {
            Some(handle) => {
                if let Err(e) = handle.await {
                    warn!("Temp file sweeper task failed: {}", e);
                }
            }
            None if self.sweep_on_shutdown => {
                self.services.temp_files().sweep_all().await;
            }
            None => {}
        }
    }
}
