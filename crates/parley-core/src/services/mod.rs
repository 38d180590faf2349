//! Services - Orchestration over the selected providers
//!
//! [`Services`] resolves the configured provider for a capability, times the
//! call under `<capability prefix>.<provider name>`, and hands scratch files
//! to the [`TempFileRegistry`] instead of deleting them.

use crate::capability::{
    ActionInference, Capability, CapabilityKind, SpeechRequest, SpeechToText, TextToSpeech,
    Tokenizer,
};
use crate::error::{Error, Result};
use crate::metrics::PerformanceMetrics;
use crate::registry::CapabilityRegistry;
use crate::tempfiles::TempFileRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Provider name selected for each capability
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSelection {
    /// Text-to-speech provider
    #[serde(default)]
    pub text_to_speech: Option<String>,
    /// Speech-to-text provider
    #[serde(default)]
    pub speech_to_text: Option<String>,
    /// Action inference provider
    #[serde(default)]
    pub action_inference: Option<String>,
    /// Tokenizer
    #[serde(default)]
    pub tokenizer: Option<String>,
}

impl ProviderSelection {
    /// Selected provider for a capability
    #[must_use]
    pub fn get(&self, kind: CapabilityKind) -> Option<&str> {
        let selected = match kind {
            CapabilityKind::TextToSpeech => &self.text_to_speech,
            CapabilityKind::SpeechToText => &self.speech_to_text,
            CapabilityKind::ActionInference => &self.action_inference,
            CapabilityKind::Tokenization => &self.tokenizer,
        };
        selected.as_deref().filter(|name| !name.is_empty())
    }

    /// Select a provider for a capability
    #[must_use]
    pub fn with(mut self, kind: CapabilityKind, name: impl Into<String>) -> Self {
        let slot = match kind {
            CapabilityKind::TextToSpeech => &mut self.text_to_speech,
            CapabilityKind::SpeechToText => &mut self.speech_to_text,
            CapabilityKind::ActionInference => &mut self.action_inference,
            CapabilityKind::Tokenization => &mut self.tokenizer,
        };
        *slot = Some(name.into());
        self
    }
}

/// Result of a speech request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOutput {
    /// Audio file; owned by the temp file registry
    pub path: PathBuf,
    /// Provider that produced it
    pub provider: String,
    /// Whether an earlier file was reused instead of synthesizing
    pub reused: bool,
}

/// Result of an inference request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inference {
    /// Generated text
    pub text: String,
    /// Prompt size according to the selected tokenizer, if any
    pub prompt_tokens: Option<usize>,
}

/// Orchestration entry point shared by request handlers
#[derive(Debug, Clone)]
pub struct Services {
    registry: Arc<CapabilityRegistry>,
    metrics: PerformanceMetrics,
    temp_files: TempFileRegistry,
    selection: ProviderSelection,
}

impl Services {
    /// Create services over a frozen registry
    #[must_use]
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        metrics: PerformanceMetrics,
        temp_files: TempFileRegistry,
        selection: ProviderSelection,
    ) -> Self {
        Self {
            registry,
            metrics,
            temp_files,
            selection,
        }
    }

    /// Provider registry
    #[must_use]
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Metrics aggregator
    #[must_use]
    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    /// Temp file registry
    #[must_use]
    pub fn temp_files(&self) -> &TempFileRegistry {
        &self.temp_files
    }

    /// Current provider selection
    #[must_use]
    pub fn selection(&self) -> &ProviderSelection {
        &self.selection
    }

    /// Check that every selected provider is registered.
    ///
    /// Capabilities without a selection are skipped; they fail with
    /// [`Error::NotConfigured`] when used.
    pub fn validate(&self) -> Result<()> {
        for kind in CapabilityKind::ALL {
            if let Some(name) = self.selection.get(kind) {
                if !self.registry.contains(kind, name) {
                    return Err(Error::ProviderNotFound {
                        capability: kind,
                        name: name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Resolve the selected provider for capability `C`
    fn selected<C>(&self) -> Result<(&str, Box<C>)>
    where
        C: Capability + ?Sized,
    {
        let name = self
            .selection
            .get(C::KIND)
            .ok_or(Error::NotConfigured(C::KIND))?;
        Ok((name, self.registry.resolve::<C>(name)?))
    }

    /// Synthesize speech, reusing an existing file for identical requests
    #[instrument(skip(self, request), fields(chars = request.text.len()))]
    pub async fn speak(&self, request: &SpeechRequest) -> Result<SpeechOutput> {
        let (name, provider) = self.selected::<dyn TextToSpeech>()?;
        let content_key = request.content_key(name);

        if let Some(path) = self.temp_files.reuse(&content_key).await {
            debug!(provider = %name, path = %path.display(), "Reusing synthesized audio");
            return Ok(SpeechOutput {
                path,
                provider: name.to_string(),
                reused: true,
            });
        }

        self.temp_files.ensure_scratch_dir().await?;
        let path = self.temp_files.scratch_path(provider.file_extension());

        let mut tracker = self
            .metrics
            .start(&CapabilityKind::TextToSpeech.metric_key(name));
        if let Err(e) = provider.synthesize(request, &path).await {
            // The provider may have left a partial file behind
            self.temp_files.mark_for_deletion(&path, false);
            return Err(e);
        }
        tracker.done();

        self.temp_files.mark_reusable(&path, content_key);
        Ok(SpeechOutput {
            path,
            provider: name.to_string(),
            reused: false,
        })
    }

    /// Transcribe an audio file
    #[instrument(skip(self))]
    pub async fn transcribe(&self, audio: &Path) -> Result<String> {
        let (name, provider) = self.selected::<dyn SpeechToText>()?;
        let mut tracker = self
            .metrics
            .start(&CapabilityKind::SpeechToText.metric_key(name));
        let text = provider.transcribe(audio).await?;
        tracker.done();
        Ok(text)
    }

    /// Generate the next response for `prompt`.
    ///
    /// When a tokenizer is selected the prompt is measured first; that nested
    /// call is excluded from the inference timing.
    #[instrument(skip(self, prompt), fields(chars = prompt.len()))]
    pub async fn infer(&self, prompt: &str) -> Result<Inference> {
        let (name, provider) = self.selected::<dyn ActionInference>()?;
        let mut tracker = self
            .metrics
            .start(&CapabilityKind::ActionInference.metric_key(name));

        let prompt_tokens = if self.selection.get(CapabilityKind::Tokenization).is_some() {
            tracker.pause();
            let counted = self.count_tokens(prompt)?;
            tracker.resume();
            Some(counted)
        } else {
            None
        };

        let text = provider.infer(prompt).await?;
        tracker.done();
        Ok(Inference {
            text,
            prompt_tokens,
        })
    }

    /// Count the tokens in `text`
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let (name, tokenizer) = self.selected::<dyn Tokenizer>()?;
        let mut tracker = self
            .metrics
            .start(&CapabilityKind::Tokenization.metric_key(name));
        let count = tokenizer.count_tokens(text);
        tracker.done();
        Ok(count)
    }
}
