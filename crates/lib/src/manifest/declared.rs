//! Providers built from manifest declarations.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use super::types::{HookKind, ProviderDecl};
use crate::host::{Core, HookError, HookResult};
use crate::provider::{Provider, ProviderId};

/// A hook invocation recorded by a [`DeclaredProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
  pub provider: ProviderId,
  pub hook: HookKind,
  pub ok: bool,
}

/// Shared, ordered record of hook invocations.
///
/// Activation is single-threaded, so the journal is shared through `Rc`.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<JournalEntry>>>);

impl Journal {
  pub fn new() -> Self {
    Self::default()
  }

  fn record(&self, provider: &ProviderId, hook: HookKind, ok: bool) {
    self.0.borrow_mut().push(JournalEntry {
      provider: provider.clone(),
      hook,
      ok,
    });
  }

  pub fn entries(&self) -> Vec<JournalEntry> {
    self.0.borrow().clone()
  }

  /// Providers that received `hook`, in invocation order.
  pub fn providers_for(&self, hook: HookKind) -> Vec<ProviderId> {
    self
      .0
      .borrow()
      .iter()
      .filter(|entry| entry.hook == hook)
      .map(|entry| entry.provider.clone())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.0.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.borrow().is_empty()
  }
}

/// A [`Provider`] whose behaviour comes from a [`ProviderDecl`].
///
/// Its register hook commits the declared aliases into the host. Every hook is
/// recorded in the shared journal, and the hook named by `fail` returns an error.
#[derive(Debug)]
pub struct DeclaredProvider {
  decl: ProviderDecl,
  journal: Journal,
}

impl DeclaredProvider {
  pub fn new(decl: ProviderDecl, journal: Journal) -> Self {
    Self { decl, journal }
  }

  fn run(&self, hook: HookKind, core: &mut dyn Core) -> HookResult {
    let result = if self.decl.fail == Some(hook) {
      Err(HookError::new(format!("{} hook of {} failed", hook, self.decl.id)))
    } else if hook == HookKind::Register {
      self
        .decl
        .aliases
        .iter()
        .try_for_each(|(name, target)| core.alias(name, target))
    } else {
      Ok(())
    };

    self.journal.record(&self.decl.id, hook, result.is_ok());
    result
  }
}

impl Provider for DeclaredProvider {
  fn id(&self) -> ProviderId {
    self.decl.id.clone()
  }

  fn provides(&self) -> &[String] {
    &self.decl.provides
  }

  fn requires(&self) -> &[String] {
    &self.decl.requires
  }

  fn capabilities(&self) -> &[ProviderId] {
    &self.decl.capabilities
  }

  fn register_with(&mut self, core: &mut dyn Core) -> HookResult {
    self.run(HookKind::Register, core)
  }

  fn boot_with(&mut self, core: &mut dyn Core) -> HookResult {
    self.run(HookKind::Boot, core)
  }

  fn unregister_with(&mut self, core: &mut dyn Core) -> HookResult {
    self.run(HookKind::Unregister, core)
  }
}
