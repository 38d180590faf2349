use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// A request to synthesize speech
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeechRequest {
    /// Text to speak
    pub text: String,
    /// Provider-specific voice identifier
    #[serde(default)]
    pub voice: Option<String>,
}

impl SpeechRequest {
    /// Create a request using the provider's default voice
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
        }
    }

    /// Select a voice
    #[must_use]
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Key identifying equivalent content for a given provider.
    ///
    /// Each field is length-prefixed (`<bytes>:<value>`, `-` for no voice),
    /// so distinct requests never share a key.
    #[must_use]
    pub fn content_key(&self, provider: &str) -> String {
        let mut key = String::with_capacity(provider.len() + self.text.len() + 16);
        for field in [Some(provider), self.voice.as_deref(), Some(self.text.as_str())] {
            match field {
                Some(value) => key.push_str(&format!("{}:{}", value.len(), value)),
                None => key.push('-'),
            }
        }
        key
    }
}

/// Text-to-speech provider
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Extension of the audio files this provider writes
    fn file_extension(&self) -> &str {
        "wav"
    }

    /// Synthesize `request` into an audio file at `destination`
    async fn synthesize(&self, request: &SpeechRequest, destination: &Path) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_key_is_stable() {
        let request = SpeechRequest::new("hello").with_voice("alloy");
        assert_eq!(request.content_key("openai"), "6:openai5:alloy5:hello");
        assert_eq!(SpeechRequest::new("hi").content_key("p"), "1:p-2:hi");
    }

    #[test]
    fn test_content_key_separates_fields() {
        let a = SpeechRequest::new("c").with_voice("a\u{1f}b");
        let b = SpeechRequest::new("b\u{1f}c").with_voice("a");
        assert_ne!(a, b);
        assert_ne!(a.content_key("p"), b.content_key("p"));

        let shifted = SpeechRequest::new("3:xyz").with_voice("1:a");
        let plain = SpeechRequest::new("xyz").with_voice("1:a3:");
        assert_ne!(shifted.content_key("p"), plain.content_key("p"));
    }

    #[test]
    fn test_content_key_distinguishes_missing_and_empty_voice() {
        let default_voice = SpeechRequest::new("hi");
        let empty_voice = SpeechRequest::new("hi").with_voice("");
        assert_ne!(default_voice.content_key("p"), empty_voice.content_key("p"));
        assert_ne!(default_voice.content_key("p"), default_voice.content_key("q"));
    }
}
