//! Configuration loading
//!
//! Layers, lowest precedence first: the embedded defaults, the user's
//! `<config dir>/parley/config.toml`, `./parley.toml`, an explicit `--config`
//! file, then `PARLEY_*` environment variables.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use std::path::{Path, PathBuf};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Per-user configuration file, if the platform has a config directory
fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("parley").join("config.toml"))
}

fn layers(explicit: Option<&Path>) -> ConfigBuilder<DefaultState> {
    let mut builder = Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

    if let Some(path) = user_config_file() {
        builder = builder.add_source(File::from(path).required(false));
    }
    builder = builder.add_source(File::with_name("parley").required(false));

    // A file named on the command line must exist
    if let Some(path) = explicit {
        builder = builder.add_source(File::from(path).required(true));
    }

    // PARLEY_PROVIDERS__TOKENIZER -> providers.tokenizer
    builder.add_source(
        Environment::with_prefix("PARLEY")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    )
}

/// Load the layered configuration, optionally with an explicit file on top
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let config = layers(explicit).build().with_context(|| match explicit {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Failed to load configuration".to_string(),
    })?;

    config
        .try_deserialize()
        .context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::CapabilityKind;

    fn embedded() -> AppConfig {
        Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_embedded_defaults() {
        let config = embedded();
        assert_eq!(
            config.providers.get(CapabilityKind::TextToSpeech),
            Some("silence")
        );
        assert_eq!(
            config.providers.get(CapabilityKind::Tokenization),
            Some("cl100k")
        );
        assert_eq!(config.temp_files.sweep_interval_secs, 300);
        assert!(config.temp_files.sweep_on_shutdown);
        assert_eq!(config.builtins.silence.sample_rate, 16_000);
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("parley.toml");
        std::fs::write(
            &path,
            "[providers]\naction_inference = \"echo\"\n[metrics]\nsample_window = 16\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.metrics.sample_window, 16);
        assert_eq!(
            config.providers.get(CapabilityKind::ActionInference),
            Some("echo")
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("absent.toml"), "{err}");
    }

    #[test]
    fn test_overrides_layer_on_top() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from_str(
                "[providers]\ntokenizer = \"whitespace\"\n[temp_files]\nsweep_interval_secs = 0\n",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            config.providers.get(CapabilityKind::Tokenization),
            Some("whitespace")
        );
        assert_eq!(
            config.providers.get(CapabilityKind::ActionInference),
            Some("echo")
        );
        assert!(config.temp_files.sweep_interval().is_none());
    }
}
