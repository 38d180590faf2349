//! Registry - Named provider factories per capability
//!
//! Registration happens on a [`CapabilityRegistryBuilder`] during startup.
//! [`CapabilityRegistryBuilder::build`] freezes it into a [`CapabilityRegistry`]
//! that only supports lookups, so it can be shared across tasks without locks.

use crate::capability::{Capability, CapabilityKind};
use crate::error::{Error, Result};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Constructor for a provider of capability `C`
type Factory<C> = Arc<dyn Fn() -> Box<C> + Send + Sync>;

/// Type-erased `Factory<C>`; the concrete `C` is fixed by the map's kind key
type ErasedFactory = Box<dyn Any + Send + Sync>;

type ProviderMap = HashMap<CapabilityKind, BTreeMap<String, ErasedFactory>>;

/// Mutable registry used while wiring up providers
#[derive(Default)]
pub struct CapabilityRegistryBuilder {
    providers: ProviderMap,
}

impl CapabilityRegistryBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named provider factory for capability `C`.
    ///
    /// Fails with [`Error::DuplicateProvider`] if `name` is already taken
    /// within the capability; the existing registration is kept.
    pub fn register<C, F>(&mut self, name: impl Into<String>, factory: F) -> Result<&mut Self>
    where
        C: Capability + ?Sized,
        F: Fn() -> Box<C> + Send + Sync + 'static,
    {
        let name = name.into();
        let names = self.providers.entry(C::KIND).or_default();
        if names.contains_key(&name) {
            return Err(Error::DuplicateProvider {
                capability: C::KIND,
                name,
            });
        }

        debug!(capability = %C::KIND, provider = %name, "Registering provider");
        let factory: Factory<C> = Arc::new(factory);
        names.insert(name, Box::new(factory));
        Ok(self)
    }

    /// Check if a provider is registered
    #[must_use]
    pub fn contains(&self, kind: CapabilityKind, name: &str) -> bool {
        self.providers
            .get(&kind)
            .is_some_and(|names| names.contains_key(name))
    }

    /// Freeze the registry
    #[must_use]
    pub fn build(self) -> CapabilityRegistry {
        let registry = CapabilityRegistry {
            providers: self.providers,
        };
        info!(providers = registry.len(), "Capability registry frozen");
        registry
    }
}

impl std::fmt::Debug for CapabilityRegistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistryBuilder")
            .field("providers", &names_by_kind(&self.providers))
            .finish()
    }
}

/// Read-only registry of provider factories
pub struct CapabilityRegistry {
    providers: ProviderMap,
}

impl CapabilityRegistry {
    /// Start a new registry
    #[must_use]
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder::new()
    }

    /// Construct a fresh instance of provider `name` for capability `C`
    pub fn resolve<C>(&self, name: &str) -> Result<Box<C>>
    where
        C: Capability + ?Sized,
    {
        let factory = self
            .providers
            .get(&C::KIND)
            .and_then(|names| names.get(name))
            .and_then(|erased| erased.downcast_ref::<Factory<C>>())
            .ok_or_else(|| Error::ProviderNotFound {
                capability: C::KIND,
                name: name.to_string(),
            })?;

        debug!(capability = %C::KIND, provider = %name, "Resolving provider");
        Ok(factory())
    }

    /// Registered provider names for capability `C`, sorted
    #[must_use]
    pub fn names<C>(&self) -> Vec<&str>
    where
        C: Capability + ?Sized,
    {
        self.names_for(C::KIND)
    }

    /// Registered provider names for a capability tag, sorted
    #[must_use]
    pub fn names_for(&self, kind: CapabilityKind) -> Vec<&str> {
        self.providers
            .get(&kind)
            .map(|names| names.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Check if a provider is registered
    #[must_use]
    pub fn contains(&self, kind: CapabilityKind, name: &str) -> bool {
        self.providers
            .get(&kind)
            .is_some_and(|names| names.contains_key(name))
    }

    /// Total number of registrations across all capabilities
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.values().map(BTreeMap::len).sum()
    }

    /// Whether nothing is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("providers", &names_by_kind(&self.providers))
            .finish()
    }
}

fn names_by_kind(providers: &ProviderMap) -> BTreeMap<CapabilityKind, Vec<&str>> {
    providers
        .iter()
        .map(|(kind, names)| (*kind, names.keys().map(String::as_str).collect()))
        .collect()
}
