//! Provider registry
//!
//! Providers are registered once, at startup, from an explicit table of
//! descriptors. Callers look them up by id, or by a human-readable source name
//! routed through the configured `sources` table.

use std::collections::BTreeMap;

use tracing::debug;

use crate::core::provider::{LyricsProvider, ProviderContext, ProviderKind};
use crate::core::providers;
use crate::error::{RegistryError, Result};

pub type ProviderFactory = fn(&ProviderContext) -> Result<Box<dyn LyricsProvider>>;

#[derive(Clone, Copy)]
pub struct ProviderDescriptor {
    pub id: &'static str,
    pub kind: ProviderKind,
    pub factory: ProviderFactory,
}

impl ProviderDescriptor {
    pub fn create(&self, ctx: &ProviderContext) -> Result<Box<dyn LyricsProvider>> {
        debug!("Creating provider {}", self.id);
        (self.factory)(ctx)
    }
}

/// How [`ProviderRegistry::discover`] hands out what it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Build one instance per provider up front.
    Eager,
    /// Return factories; the caller builds a fresh instance per request.
    OnDemand,
}

pub enum ProviderSlot {
    Factory(ProviderFactory),
    Instance(Box<dyn LyricsProvider>),
}

#[derive(Default)]
pub struct ProviderRegistry {
    descriptors: BTreeMap<&'static str, ProviderDescriptor>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in provider.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for descriptor in providers::builtin() {
            let registered = registry.register(descriptor);
            debug_assert!(registered.is_ok(), "duplicate built-in provider {}", descriptor.id);
        }
        registry
    }

    pub fn register(&mut self, descriptor: ProviderDescriptor) -> std::result::Result<(), RegistryError> {
        if self.descriptors.contains_key(descriptor.id) {
            return Err(RegistryError::Duplicate {
                name: descriptor.id.to_string(),
            });
        }
        debug!("Registered provider {} ({:?})", descriptor.id, descriptor.kind);
        self.descriptors.insert(descriptor.id, descriptor);
        Ok(())
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.keys().copied()
    }

    pub fn descriptor(&self, id: &str) -> std::result::Result<&ProviderDescriptor, RegistryError> {
        self.descriptors.get(id).ok_or_else(|| RegistryError::NotFound {
            name: id.to_string(),
        })
    }

    /// Fresh provider instance for `id`.
    pub fn create(&self, id: &str, ctx: &ProviderContext) -> Result<Box<dyn LyricsProvider>> {
        self.descriptor(id)?.create(ctx)
    }

    /// Every provider matching `predicate`, keyed by id.
    pub fn discover<P>(
        &self,
        predicate: P,
        mode: LoadMode,
        ctx: &ProviderContext,
    ) -> Result<BTreeMap<&'static str, ProviderSlot>>
    where
        P: Fn(&ProviderDescriptor) -> bool,
    {
        let mut found = BTreeMap::new();
        for descriptor in self.descriptors.values().filter(|d| predicate(*d)) {
            let slot = match mode {
                LoadMode::Eager => ProviderSlot::Instance(descriptor.create(ctx)?),
                LoadMode::OnDemand => ProviderSlot::Factory(descriptor.factory),
            };
            found.insert(descriptor.id, slot);
        }
        Ok(found)
    }

    /// Resolve a user-facing source name through `sources` (name → provider id).
    pub fn resolve_source(
        &self,
        sources: &BTreeMap<String, String>,
        name: &str,
    ) -> std::result::Result<&ProviderDescriptor, RegistryError> {
        let id = sources.get(name).ok_or_else(|| RegistryError::NotFound {
            name: name.to_string(),
        })?;
        self.descriptor(id)
    }
}
