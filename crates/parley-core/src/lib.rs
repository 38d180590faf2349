//! Parley Core - Capability Registry and Runtime Instrumentation
//!
//! This crate provides the plumbing shared by every Parley provider:
//! - Capability: sealed provider interfaces (TTS, STT, action inference, tokenization)
//! - Registry: named provider factories per capability, frozen after startup
//! - Metrics: pausable per-operation timing with per-key averages
//! - Temp files: deferred, reuse-aware deletion of provider scratch files
//! - Services: orchestration that ties the above together

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod capability;
pub mod error;
pub mod metrics;
pub mod registry;
pub mod services;
pub mod tempfiles;

pub use capability::{
    ActionInference, Capability, CapabilityKind, SpeechRequest, SpeechToText, TextToSpeech,
    Tokenizer,
};
pub use error::{Error, Result};
pub use metrics::{MetricsSnapshot, PerformanceMetrics, Tracker};
pub use registry::{CapabilityRegistry, CapabilityRegistryBuilder};
pub use services::{Inference, ProviderSelection, Services, SpeechOutput};
pub use tempfiles::{spawn_sweeper, SweepReport, SweeperConfig, TempFileRegistry};
