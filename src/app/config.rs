//! Application configuration types

use parley_core::ProviderSelection;
use parley_providers::BuiltinsConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Selected provider per capability
    #[serde(default)]
    pub providers: ProviderSelection,
    #[serde(default)]
    pub temp_files: TempFilesConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub builtins: BuiltinsConfig,
}

/// Scratch file handling
#[derive(Debug, Clone, Deserialize)]
pub struct TempFilesConfig {
    /// Scratch directory; defaults to the platform cache dir
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Seconds between background sweeps (0 = no background sweeper)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Delete every pending file on exit
    #[serde(default = "default_true")]
    pub sweep_on_shutdown: bool,
}

impl TempFilesConfig {
    /// Resolved scratch directory
    pub fn scratch_dir(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("parley")
                .join("scratch")
        })
    }

    /// Background sweep interval, if enabled
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0).then(|| Duration::from_secs(self.sweep_interval_secs))
    }
}

impl Default for TempFilesConfig {
    fn default() -> Self {
        Self {
            directory: None,
            sweep_interval_secs: default_sweep_interval_secs(),
            sweep_on_shutdown: true,
        }
    }
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Recent samples kept per key
    #[serde(default = "default_sample_window")]
    pub sample_window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            sample_window: default_sample_window(),
        }
    }
}

fn default_sample_window() -> usize {
    parley_core::metrics::DEFAULT_SAMPLE_WINDOW
}
