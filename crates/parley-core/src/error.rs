//! Error types for parley-core

use crate::capability::CapabilityKind;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// A provider with the same name is already registered for the capability
    #[error("duplicate {capability} provider: {name}")]
    DuplicateProvider {
        /// Capability the registration targeted
        capability: CapabilityKind,
        /// Conflicting provider name
        name: String,
    },

    /// No provider with that name is registered for the capability
    #[error("{capability} provider not found: {name}")]
    ProviderNotFound {
        /// Capability that was queried
        capability: CapabilityKind,
        /// Requested provider name
        name: String,
    },

    /// No provider is selected for the capability
    #[error("no {0} provider configured")]
    NotConfigured(CapabilityKind),

    /// A provider failed while serving a request
    #[error("provider {provider} failed: {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Failure description
        message: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a provider failure
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether the error points at misconfiguration rather than a runtime failure
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateProvider { .. } | Self::ProviderNotFound { .. } | Self::NotConfigured(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
