//! Resolution of provider identifiers into default instances.
//!
//! Instead of looking types up at runtime, every identifier that can be
//! registered by name is mapped explicitly to a factory. The registry passes a
//! read-only [`ProviderContext`] view of itself into the factory.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::{ActivationState, Provider, ProviderId};
use crate::alias::AliasTable;
use crate::host::HookError;
use crate::registry::ProviderEntry;

/// Builds a default provider instance.
pub type ProviderFactory = Box<dyn Fn(&ProviderContext<'_>) -> Result<Box<dyn Provider>, HookError>>;

/// Reasons a provider identifier could not be turned into a valid provider.
#[derive(Debug, Error)]
pub enum ResolveError {
  /// The identifier was empty.
  #[error("provider identifier is empty")]
  EmptyId,

  /// No factory is registered for the identifier.
  #[error("provider {0} is not a known provider")]
  Unknown(ProviderId),

  /// The factory failed to construct an instance.
  #[error("provider {id} could not be constructed")]
  Factory {
    id: ProviderId,
    #[source]
    source: HookError,
  },

  /// The factory produced a provider of a different type.
  #[error("provider {requested} is not a valid provider: factory produced {built}")]
  Mismatch { requested: ProviderId, built: ProviderId },
}

/// Read-only view of a registry, handed to factories during resolution.
pub struct ProviderContext<'a> {
  entries: &'a [ProviderEntry],
  aliases: &'a AliasTable,
  booted: bool,
}

impl<'a> ProviderContext<'a> {
  pub(crate) fn new(entries: &'a [ProviderEntry], aliases: &'a AliasTable, booted: bool) -> Self {
    Self {
      entries,
      aliases,
      booted,
    }
  }

  pub fn is_booted(&self) -> bool {
    self.booted
  }

  /// Identifiers of the providers currently registered, in collection order.
  pub fn providers(&self) -> impl Iterator<Item = &'a ProviderId> {
    self.entries.iter().map(|entry| &entry.id)
  }

  /// Activation state of a registered provider.
  pub fn state_of(&self, id: &ProviderId) -> Option<ActivationState> {
    self
      .entries
      .iter()
      .find(|entry| entry.provider.answers_to(id))
      .map(|entry| entry.state)
  }

  /// Whether any registered provider supplies `service`.
  pub fn supplies(&self, service: &str) -> bool {
    self
      .entries
      .iter()
      .any(|entry| entry.provider.provides().iter().any(|s| s == service))
  }

  pub fn alias(&self, name: &str) -> Option<&'a str> {
    self.aliases.get(name)
  }
}

/// Explicit mapping from provider identifiers to factories.
#[derive(Default)]
pub struct ProviderCatalog {
  factories: BTreeMap<ProviderId, ProviderFactory>,
}

impl ProviderCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a factory for `id`, replacing any previous one.
  ///
  /// Returns `true` if a factory was replaced.
  pub fn register<F>(&mut self, id: impl Into<ProviderId>, factory: F) -> bool
  where
    F: Fn(&ProviderContext<'_>) -> Result<Box<dyn Provider>, HookError> + 'static,
  {
    self.factories.insert(id.into(), Box::new(factory)).is_some()
  }

  /// Builder-style variant of [`register`](Self::register).
  pub fn with<F>(mut self, id: impl Into<ProviderId>, factory: F) -> Self
  where
    F: Fn(&ProviderContext<'_>) -> Result<Box<dyn Provider>, HookError> + 'static,
  {
    self.register(id, factory);
    self
  }

  pub fn contains(&self, id: &ProviderId) -> bool {
    self.factories.contains_key(id)
  }

  pub fn len(&self) -> usize {
    self.factories.len()
  }

  pub fn is_empty(&self) -> bool {
    self.factories.is_empty()
  }

  /// Build a default instance for `id` and check it is the provider asked for.
  pub fn build(&self, id: &ProviderId, context: &ProviderContext<'_>) -> Result<Box<dyn Provider>, ResolveError> {
    if id.as_str().is_empty() {
      return Err(ResolveError::EmptyId);
    }

    let factory = self.factories.get(id).ok_or_else(|| ResolveError::Unknown(id.clone()))?;
    let provider = factory(context).map_err(|source| ResolveError::Factory {
      id: id.clone(),
      source,
    })?;

    let built = provider.id();
    if built != *id {
      return Err(ResolveError::Mismatch {
        requested: id.clone(),
        built,
      });
    }

    debug!(provider = %id, "resolved provider from catalog");
    Ok(provider)
  }
}

impl fmt::Debug for ProviderCatalog {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ProviderCatalog")
      .field("ids", &self.factories.keys().collect::<Vec<_>>())
      .finish()
  }
}
