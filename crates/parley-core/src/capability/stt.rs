use async_trait::async_trait;
use std::path::Path;

use crate::error::Result;

/// Speech-to-text provider
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the audio file at `audio`
    async fn transcribe(&self, audio: &Path) -> Result<String>;
}
