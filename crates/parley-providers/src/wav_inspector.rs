use async_trait::async_trait;
use parley_core::{Error, Result, SpeechToText};
use std::io::Cursor;
use std::path::Path;

use crate::names;

/// Normalized RMS below which a recording counts as silence
const SILENCE_RMS: f64 = 0.01;

/// Describes a WAV recording (`[silence 1.25s]`, `[audio 3.00s]`) in place
/// of a transcript. Useful for exercising pipelines without a model.
#[derive(Debug, Clone, Default)]
pub struct WavInspector;

impl WavInspector {
    fn describe(bytes: &[u8]) -> Result<String> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| Error::provider(names::WAV_INSPECTOR, format!("Failed to read WAV: {e}")))?;
        let spec = reader.spec();
        let frames = reader.duration();

        let samples: Vec<f64> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .filter_map(|s| s.ok())
                .map(f64::from)
                .collect(),
            hound::SampleFormat::Int => {
                let max_val = (1u64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f64;
                reader
                    .into_samples::<i32>()
                    .filter_map(|s| s.ok())
                    .map(|s| f64::from(s) / max_val)
                    .collect()
            }
        };

        let rms = if samples.is_empty() {
            0.0
        } else {
            (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
        };
        let secs = f64::from(frames) / f64::from(spec.sample_rate.max(1));
        let label = if rms < SILENCE_RMS { "silence" } else { "audio" };

        Ok(format!("[{label} {secs:.2}s]"))
    }
}

#[async_trait]
impl SpeechToText for WavInspector {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        let bytes = tokio::fs::read(audio).await?;
        Self::describe(&bytes)
    }
}
