//! Capability - Provider interfaces and their tags
//!
//! Every provider implements exactly one of a closed set of capability
//! interfaces. The set is sealed: [`Capability`] is only implemented for the
//! trait objects declared in this module, so the registry can key factories
//! by [`CapabilityKind`] and downcast them without ambiguity.

mod action;
mod stt;
mod tokenizer;
mod tts;

pub use action::ActionInference;
pub use stt::SpeechToText;
pub use tokenizer::Tokenizer;
pub use tts::{SpeechRequest, TextToSpeech};

use serde::{Deserialize, Serialize};

/// Tag identifying which interface a provider implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Text-to-speech synthesis
    TextToSpeech,
    /// Speech-to-text transcription
    SpeechToText,
    /// Next-action inference (text generation)
    ActionInference,
    /// Token counting
    Tokenization,
}

impl CapabilityKind {
    /// Every capability, in declaration order
    pub const ALL: [CapabilityKind; 4] = [
        Self::TextToSpeech,
        Self::SpeechToText,
        Self::ActionInference,
        Self::Tokenization,
    ];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TextToSpeech => "text-to-speech",
            Self::SpeechToText => "speech-to-text",
            Self::ActionInference => "action-inference",
            Self::Tokenization => "tokenization",
        }
    }

    /// Short prefix used when composing metric keys
    #[must_use]
    pub fn metric_prefix(&self) -> &'static str {
        match self {
            Self::TextToSpeech => "tts",
            Self::SpeechToText => "stt",
            Self::ActionInference => "action",
            Self::Tokenization => "tokenizer",
        }
    }

    /// Metric key for a provider of this capability, e.g. `tts.elevenlabs`
    #[must_use]
    pub fn metric_key(&self, provider: &str) -> String {
        format!("{}.{}", self.metric_prefix(), provider)
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for dyn super::TextToSpeech {}
    impl Sealed for dyn super::SpeechToText {}
    impl Sealed for dyn super::ActionInference {}
    impl Sealed for dyn super::Tokenizer {}
}

/// A capability interface that providers can be registered under.
///
/// Implemented for `dyn TextToSpeech`, `dyn SpeechToText`,
/// `dyn ActionInference` and `dyn Tokenizer` only.
pub trait Capability: sealed::Sealed + Send + Sync + 'static {
    /// Tag of this capability
    const KIND: CapabilityKind;
}

impl Capability for dyn TextToSpeech {
    const KIND: CapabilityKind = CapabilityKind::TextToSpeech;
}

impl Capability for dyn SpeechToText {
    const KIND: CapabilityKind = CapabilityKind::SpeechToText;
}

impl Capability for dyn ActionInference {
    const KIND: CapabilityKind = CapabilityKind::ActionInference;
}

impl Capability for dyn Tokenizer {
    const KIND: CapabilityKind = CapabilityKind::Tokenization;
}
