use async_trait::async_trait;
use parley_core::{Error, Result, SpeechRequest, TextToSpeech};
use serde::Deserialize;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

use crate::names;

/// Settings for [`SilentSpeech`]
#[derive(Debug, Clone, Deserialize)]
pub struct SilentSpeechConfig {
    /// Output sample rate in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Speaking rate used to size the output
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f32,
}

fn default_sample_rate() -> u32 {
    16_000
}

fn default_chars_per_second() -> f32 {
    15.0
}

impl Default for SilentSpeechConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            chars_per_second: default_chars_per_second(),
        }
    }
}

/// Writes mono 16-bit silence lasting as long as the text would take to read
#[derive(Debug, Clone, Default)]
pub struct SilentSpeech {
    config: SilentSpeechConfig,
}

impl SilentSpeech {
    /// Create a synthesizer with the given output settings
    #[must_use]
    pub fn new(config: SilentSpeechConfig) -> Self {
        Self { config }
    }

    fn duration_secs(&self, text: &str) -> f32 {
        const MIN_SECS: f32 = 0.25;
        let rate = self.config.chars_per_second.max(1.0);
        (text.chars().count() as f32 / rate).max(MIN_SECS)
    }

    fn render(&self, text: &str) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.config.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let samples = (self.duration_secs(text) * self.config.sample_rate as f32) as u32;

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::provider(names::SILENCE, format!("Failed to create WAV: {e}")))?;
            for _ in 0..samples {
                writer.write_sample(0i16).map_err(|e| {
                    Error::provider(names::SILENCE, format!("Failed to write sample: {e}"))
                })?;
            }
            writer.finalize().map_err(|e| {
                Error::provider(names::SILENCE, format!("Failed to finalize WAV: {e}"))
            })?;
        }
        Ok(cursor.into_inner())
    }
}

#[async_trait]
impl TextToSpeech for SilentSpeech {
    async fn synthesize(&self, request: &SpeechRequest, destination: &Path) -> Result<()> {
        if request.text.trim().is_empty() {
            return Err(Error::provider(names::SILENCE, "empty text"));
        }

        let wav = self.render(&request.text)?;
        debug!(
            bytes = wav.len(),
            path = %destination.display(),
            "Writing silent speech"
        );
        tokio::fs::write(destination, wav).await?;
        Ok(())
    }
}
