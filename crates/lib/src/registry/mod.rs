//! The provider registry and its two-phase activation protocol.
//!
//! A [`Registry`] accumulates providers and aliases, then `boot()` runs:
//!
//! 1. sort: ask the [`OrderingResolver`] for a dependency-consistent order
//! 2. register: `register_with` on every provider still unregistered
//! 3. boot: `boot_with` on every provider, in the same order
//! 4. aliases: commit every alias into the host
//!
//! A fault in any hook aborts `boot()` with [`RegistryError::Execution`] naming
//! the provider or alias. Nothing is rolled back; [`Registry::boot_state`] then
//! reports the registry as partially activated.
//!
//! Dropping the registry runs [`Registry::shutdown`], which unregisters every
//! remaining provider and never stops on a failure.

mod shutdown;
mod types;

use std::fmt;

use tracing::{debug, info, trace};

pub use shutdown::{ShutdownReport, TeardownFailure};
pub use types::{BootState, ErrorKind, HookPhase, RegistryError, Subject};

use crate::alias::AliasTable;
use crate::config::{RebootPolicy, RegistryConfig};
use crate::host::Core;
use crate::provider::{ActivationState, Provider, ProviderCatalog, ProviderContext, ProviderId, ProviderRef, ResolveError};
use crate::sort::{DependencySorter, OrderingResolver, SortNode, validate_permutation};

/// A registered provider and its activation state.
pub(crate) struct ProviderEntry {
  pub(crate) id: ProviderId,
  pub(crate) provider: Box<dyn Provider>,
  pub(crate) state: ActivationState,
}

impl ProviderEntry {
  fn new(provider: Box<dyn Provider>) -> Self {
    let state = if provider.is_registered() {
      ActivationState::Registered
    } else {
      ActivationState::Unregistered
    };

    Self {
      id: provider.id(),
      provider,
      state,
    }
  }
}

/// Owns providers and aliases for one host and drives their activation.
pub struct Registry<'c, C: Core> {
  core: &'c mut C,
  entries: Vec<ProviderEntry>,
  aliases: AliasTable,
  catalog: ProviderCatalog,
  resolver: Box<dyn OrderingResolver>,
  config: RegistryConfig,
  booted: bool,
  failed: Option<Subject>,
}

impl<'c, C: Core> Registry<'c, C> {
  /// Create a registry bound to `core` with default configuration.
  pub fn new(core: &'c mut C) -> Self {
    Self::with_config(core, RegistryConfig::default())
  }

  pub fn with_config(core: &'c mut C, config: RegistryConfig) -> Self {
    Self {
      core,
      entries: Vec::new(),
      aliases: AliasTable::new(),
      catalog: ProviderCatalog::new(),
      resolver: Box::new(DependencySorter::new()),
      config,
      booted: false,
      failed: None,
    }
  }

  /// Use `catalog` to resolve providers registered by identifier.
  pub fn with_catalog(mut self, catalog: ProviderCatalog) -> Self {
    self.catalog = catalog;
    self
  }

  /// Replace the default [`DependencySorter`].
  pub fn with_resolver(mut self, resolver: impl OrderingResolver + 'static) -> Self {
    self.resolver = Box::new(resolver);
    self
  }

  pub fn core(&self) -> &C {
    &*self.core
  }

  pub fn config(&self) -> &RegistryConfig {
    &self.config
  }

  pub fn is_booted(&self) -> bool {
    self.booted
  }

  pub fn boot_state(&self) -> BootState {
    match (&self.failed, self.booted) {
      (Some(failed), _) => BootState::PartiallyActivated { failed: failed.clone() },
      (None, true) => BootState::Booted,
      (None, false) => BootState::Pending,
    }
  }

  /// Activation state of the provider answering to `id`.
  pub fn state_of(&self, id: &ProviderId) -> Option<ActivationState> {
    self.position_of(id).map(|pos| self.entries[pos].state)
  }

  /// Register a live provider instance.
  pub fn register<P: Provider + 'static>(&mut self, provider: P) -> Result<(), RegistryError> {
    self.register_provider(ProviderRef::instance(provider))
  }

  /// Register a provider, given as an instance or as a catalog identifier.
  ///
  /// Before boot the provider is only recorded. After boot its register hook
  /// runs immediately.
  ///
  /// # Errors
  ///
  /// - `ProviderConflict` if a provider answering to the same id is registered
  /// - `InvalidArgument` if an identifier cannot be resolved through the catalog
  /// - `Execution` if the late register hook fails
  pub fn register_provider(&mut self, provider: impl Into<ProviderRef>) -> Result<(), RegistryError> {
    let provider = provider.into();
    let id = provider.id();

    if self.position_of(&id).is_some() {
      return Err(RegistryError::ProviderConflict(id));
    }

    let provider = match provider {
      ProviderRef::Instance(provider) => provider,
      ProviderRef::Id(id) => self.catalog.build(&id, &self.context())?,
    };

    let mut entry = ProviderEntry::new(provider);
    if self.booted {
      debug!(provider = %entry.id, "registering provider after boot");
      entry
        .provider
        .register_with(&mut *self.core)
        .map_err(RegistryError::execution(
          Subject::Provider(entry.id.clone()),
          HookPhase::Register,
        ))?;
      entry.state = ActivationState::Registered;
    } else {
      trace!(provider = %entry.id, state = %entry.state, "recorded provider");
    }

    self.entries.push(entry);
    Ok(())
  }

  /// Unregister the first provider answering to the given id.
  ///
  /// A failing unregister hook is returned as [`RegistryError::Hook`] and the
  /// provider stays registered.
  pub fn unregister_provider(&mut self, provider: impl Into<ProviderRef>) -> Result<(), RegistryError> {
    let provider = provider.into();
    let id = provider.id();

    let Some(pos) = self.position_of(&id) else {
      if let ProviderRef::Id(_) = provider {
        if id.as_str().is_empty() {
          return Err(ResolveError::EmptyId.into());
        }
        if !self.catalog.contains(&id) {
          return Err(ResolveError::Unknown(id).into());
        }
      }
      return Err(RegistryError::ProviderNotFound(id));
    };

    let entry = &mut self.entries[pos];
    debug!(provider = %entry.id, "unregistering provider");
    entry
      .provider
      .unregister_with(&mut *self.core)
      .map_err(RegistryError::Hook)?;

    self.entries.remove(pos);
    Ok(())
  }

  /// The first provider answering to `id`, by type or capability.
  pub fn get_provider(&self, id: &ProviderId) -> Option<&dyn Provider> {
    self.position_of(id).map(|pos| &*self.entries[pos].provider)
  }

  /// Identifiers of every registered provider, in collection order.
  pub fn get_providers(&self) -> Vec<ProviderId> {
    self.entries.iter().map(|entry| entry.id.clone()).collect()
  }

  /// Every service name declared by registered providers, in collection order.
  ///
  /// Names are not deduplicated.
  pub fn get_services(&self) -> Vec<String> {
    self
      .entries
      .iter()
      .flat_map(|entry| entry.provider.provides().iter().cloned())
      .collect()
  }

  /// Drop every provider without running hooks. Only allowed before boot.
  pub fn flush_providers(&mut self) -> Result<(), RegistryError> {
    if self.booted {
      return Err(RegistryError::IllegalState {
        operation: "flush_providers",
      });
    }

    debug!(count = self.entries.len(), "flushing providers");
    self.entries.clear();
    self.failed = None;
    Ok(())
  }

  /// Register `name -> target`.
  ///
  /// After boot the alias is also committed into the host; if that fails the
  /// alias stays in the table and `Execution` is returned.
  pub fn register_alias(&mut self, name: impl Into<String>, target: impl Into<String>) -> Result<(), RegistryError> {
    let name = name.into();
    let target = target.into();

    if self.aliases.contains(&name) {
      return Err(RegistryError::AliasConflict(name));
    }

    self.aliases.insert(name.clone(), target.clone());
    trace!(alias = %name, to = %target, "recorded alias");

    if self.booted {
      self
        .core
        .alias(&name, &target)
        .map_err(RegistryError::execution(Subject::Alias(name), HookPhase::Alias))?;
    }

    Ok(())
  }

  /// Remove an alias from the table and from the host.
  ///
  /// The host's `remove` is called whether or not the registry has booted. If it
  /// fails the alias stays in the table and the fault is returned unwrapped.
  pub fn unregister_alias(&mut self, name: &str) -> Result<(), RegistryError> {
    if !self.aliases.contains(name) {
      return Err(RegistryError::AliasNotFound(name.to_string()));
    }

    self.core.remove(name).map_err(RegistryError::Hook)?;
    self.aliases.remove(name);
    Ok(())
  }

  pub fn get_alias(&self, name: &str) -> Option<&str> {
    self.aliases.get(name)
  }

  pub fn get_aliases(&self) -> &AliasTable {
    &self.aliases
  }

  /// Drop every alias without touching the host. Only allowed before boot.
  pub fn flush_aliases(&mut self) -> Result<(), RegistryError> {
    if self.booted {
      return Err(RegistryError::IllegalState {
        operation: "flush_aliases",
      });
    }

    self.aliases.clear();
    Ok(())
  }

  /// Sort, register, boot and commit aliases.
  ///
  /// # Errors
  ///
  /// - `IllegalState` if already booted and [`RebootPolicy::Reject`] is configured
  /// - `Overflow` if no activation order exists; no hook has run
  /// - `Execution` naming the first provider or alias whose hook failed
  pub fn boot(&mut self) -> Result<(), RegistryError> {
    let rerun = self.booted;
    if rerun && self.config.reboot == RebootPolicy::Reject {
      return Err(RegistryError::IllegalState { operation: "boot" });
    }

    info!(
      providers = self.entries.len(),
      aliases = self.aliases.len(),
      rerun,
      "booting registry"
    );

    self.sort_providers()?;

    if let Err(err) = self.activate(rerun) {
      if let Some(subject) = err.subject() {
        self.failed = Some(subject.clone());
      }
      return Err(err);
    }

    self.booted = true;
    self.failed = None;
    info!(providers = self.entries.len(), "registry booted");
    Ok(())
  }

  fn activate(&mut self, rerun: bool) -> Result<(), RegistryError> {
    self.register_providers()?;
    self.boot_providers(rerun)?;
    self.register_aliases()
  }

  /// Reorder the collection into activation order.
  fn sort_providers(&mut self) -> Result<(), RegistryError> {
    let order = {
      let nodes: Vec<SortNode<'_>> = self
        .entries
        .iter()
        .map(|entry| SortNode {
          id: &entry.id,
          provides: entry.provider.provides(),
          requires: entry.provider.requires(),
        })
        .collect();

      let order = self.resolver.order(&nodes)?;
      validate_permutation(&order, nodes.len())?;
      order
    };

    let mut slots: Vec<Option<ProviderEntry>> = std::mem::take(&mut self.entries).into_iter().map(Some).collect();
    self.entries = order.into_iter().filter_map(|pos| slots[pos].take()).collect();

    debug!(order = ?self.get_providers(), "sorted providers");
    Ok(())
  }

  fn register_providers(&mut self) -> Result<(), RegistryError> {
    for entry in &mut self.entries {
      if entry.state != ActivationState::Unregistered {
        trace!(provider = %entry.id, state = %entry.state, "skipping registration");
        continue;
      }

      debug!(provider = %entry.id, "registering provider");
      entry
        .provider
        .register_with(&mut *self.core)
        .map_err(RegistryError::execution(
          Subject::Provider(entry.id.clone()),
          HookPhase::Register,
        ))?;
      entry.state = ActivationState::Registered;
    }

    Ok(())
  }

  /// Boot every provider. Outside a rerun, providers booted by an earlier
  /// partial attempt are skipped.
  fn boot_providers(&mut self, rerun: bool) -> Result<(), RegistryError> {
    for entry in &mut self.entries {
      if entry.state == ActivationState::Booted && !rerun {
        trace!(provider = %entry.id, "skipping boot");
        continue;
      }

      debug!(provider = %entry.id, "booting provider");
      entry
        .provider
        .boot_with(&mut *self.core)
        .map_err(RegistryError::execution(
          Subject::Provider(entry.id.clone()),
          HookPhase::Boot,
        ))?;
      entry.state = ActivationState::Booted;
    }

    Ok(())
  }

  fn register_aliases(&mut self) -> Result<(), RegistryError> {
    for (name, target) in self.aliases.iter() {
      debug!(alias = name, to = target, "committing alias");
      self
        .core
        .alias(name, target)
        .map_err(RegistryError::execution(Subject::Alias(name.to_string()), HookPhase::Alias))?;
    }

    Ok(())
  }

  fn position_of(&self, id: &ProviderId) -> Option<usize> {
    self.entries.iter().position(|entry| entry.provider.answers_to(id))
  }

  fn context(&self) -> ProviderContext<'_> {
    ProviderContext::new(&self.entries, &self.aliases, self.booted)
  }
}

impl<C: Core> fmt::Debug for Registry<'_, C> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Registry")
      .field("providers", &self.get_providers())
      .field("aliases", &self.aliases)
      .field("boot_state", &self.boot_state())
      .field("config", &self.config)
      .finish()
  }
}
