//! Parley Providers - Built-in local providers
//!
//! Providers that work offline, without API keys:
//! - `silence`: text-to-speech writing silent PCM WAV sized to the text
//! - `wav-inspector`: speech-to-text that describes a WAV file instead of transcribing it
//! - `echo`: action inference that answers with the last prompt line
//! - `whitespace` / `cl100k`: tokenizers

#![forbid(unsafe_code)]

mod echo;
mod silence;
mod tokenizers;
mod wav_inspector;

pub use echo::EchoInference;
pub use silence::{SilentSpeech, SilentSpeechConfig};
pub use tokenizers::{Cl100kTokenizer, WhitespaceTokenizer};
pub use wav_inspector::WavInspector;

use parley_core::{
    ActionInference, CapabilityRegistryBuilder, Result, SpeechToText, TextToSpeech, Tokenizer,
};
use serde::Deserialize;

/// Provider names registered by [`register_builtins`]
pub mod names {
    /// Silent WAV synthesizer
    pub const SILENCE: &str = "silence";
    /// WAV inspector
    pub const WAV_INSPECTOR: &str = "wav-inspector";
    /// Echo inference
    pub const ECHO: &str = "echo";
    /// Whitespace tokenizer
    pub const WHITESPACE: &str = "whitespace";
    /// cl100k_base BPE tokenizer
    pub const CL100K: &str = "cl100k";
}

/// Configuration for the built-in providers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuiltinsConfig {
    /// Silent synthesizer settings
    #[serde(default)]
    pub silence: SilentSpeechConfig,
}

/// Register all built-in providers with default configuration
pub fn register_builtins(builder: &mut CapabilityRegistryBuilder) -> Result<()> {
    register_builtins_with_config(builder, &BuiltinsConfig::default())
}

/// Register all built-in providers with custom configuration
pub fn register_builtins_with_config(
    builder: &mut CapabilityRegistryBuilder,
    config: &BuiltinsConfig,
) -> Result<()> {
    let silence = config.silence.clone();

    builder
        .register::<dyn TextToSpeech, _>(names::SILENCE, move || {
            Box::new(SilentSpeech::new(silence.clone()))
        })?
        .register::<dyn SpeechToText, _>(names::WAV_INSPECTOR, || Box::new(WavInspector))?
        .register::<dyn ActionInference, _>(names::ECHO, || Box::new(EchoInference))?
        .register::<dyn Tokenizer, _>(names::WHITESPACE, || Box::new(WhitespaceTokenizer))?
        .register::<dyn Tokenizer, _>(names::CL100K, || Box::new(Cl100kTokenizer))?;

    Ok(())
}
