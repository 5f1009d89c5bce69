//! Providers: independently-authored units that configure a host [`Core`].
//!
//! A provider declares which service names it supplies and which it needs from
//! its siblings. The registry uses those declarations to order activation and
//! then calls the provider's hooks in two phases:
//!
//! 1. `register_with` for every provider, in dependency order
//! 2. `boot_with` for every provider, in the same order
//!
//! Providers can be handed to the registry as live instances or as a
//! [`ProviderId`] that the registry's [`ProviderCatalog`] knows how to build.

mod catalog;
mod types;

use std::fmt;

pub use catalog::{ProviderCatalog, ProviderContext, ProviderFactory, ResolveError};
pub use types::{ActivationState, ProviderId};

use crate::host::{Core, HookResult};

/// An activatable unit with register, boot and unregister hooks.
pub trait Provider {
  /// The provider's type identity.
  fn id(&self) -> ProviderId;

  /// Service names this provider supplies.
  fn provides(&self) -> &[String] {
    &[]
  }

  /// Service names that must be supplied by sibling providers activated earlier.
  fn requires(&self) -> &[String] {
    &[]
  }

  /// Extra identities this provider answers to when looked up.
  fn capabilities(&self) -> &[ProviderId] {
    &[]
  }

  /// Whether the provider was already registered before being handed over.
  ///
  /// A provider reporting `true` is skipped by the register phase.
  fn is_registered(&self) -> bool {
    false
  }

  fn register_with(&mut self, core: &mut dyn Core) -> HookResult;

  fn boot_with(&mut self, _core: &mut dyn Core) -> HookResult {
    Ok(())
  }

  fn unregister_with(&mut self, _core: &mut dyn Core) -> HookResult {
    Ok(())
  }

  /// Whether this provider answers to `id`, either as its own type or as a capability.
  fn answers_to(&self, id: &ProviderId) -> bool {
    self.id() == *id || self.capabilities().contains(id)
  }
}

/// A provider handed to the registry, either live or by identifier.
pub enum ProviderRef {
  Instance(Box<dyn Provider>),
  Id(ProviderId),
}

impl ProviderRef {
  pub fn instance(provider: impl Provider + 'static) -> Self {
    ProviderRef::Instance(Box::new(provider))
  }

  /// The identifier this reference points at.
  pub fn id(&self) -> ProviderId {
    match self {
      ProviderRef::Instance(provider) => provider.id(),
      ProviderRef::Id(id) => id.clone(),
    }
  }
}

impl fmt::Debug for ProviderRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProviderRef::Instance(provider) => f.debug_tuple("Instance").field(&provider.id()).finish(),
      ProviderRef::Id(id) => f.debug_tuple("Id").field(id).finish(),
    }
  }
}

impl From<Box<dyn Provider>> for ProviderRef {
  fn from(provider: Box<dyn Provider>) -> Self {
    ProviderRef::Instance(provider)
  }
}

impl From<ProviderId> for ProviderRef {
  fn from(id: ProviderId) -> Self {
    ProviderRef::Id(id)
  }
}

impl From<&ProviderId> for ProviderRef {
  fn from(id: &ProviderId) -> Self {
    ProviderRef::Id(id.clone())
  }
}

impl From<&str> for ProviderRef {
  fn from(id: &str) -> Self {
    ProviderRef::Id(ProviderId::from(id))
  }
}
