//! The host container that providers configure.
//!
//! The registry never owns the host. It borrows something implementing [`Core`]
//! for its whole lifetime, hands it to every provider hook, and forwards alias
//! registrations and removals into it.
//!
//! [`MemoryCore`] is a small in-memory host used by the CLI and by tests: it keeps
//! the committed aliases and an ordered journal of every call it received.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use serde::Serialize;
use thiserror::Error;
use tracing::trace;

/// Boxed error used as the cause of a [`HookError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result returned by every provider hook and every [`Core`] call.
pub type HookResult = Result<(), HookError>;

/// A fault raised by externally-supplied code.
///
/// Provider hooks and host calls report every failure through this one type. The
/// registry wraps it into [`RegistryError::Execution`](crate::RegistryError::Execution)
/// where the fault happened during registration, boot or alias commit.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
  message: String,
  #[source]
  source: Option<BoxError>,
}

impl HookError {
  /// Create a hook error with a message and no underlying cause.
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      source: None,
    }
  }

  /// Create a hook error wrapping an underlying cause.
  pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
    Self {
      message: message.into(),
      source: Some(source.into()),
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

impl From<String> for HookError {
  fn from(message: String) -> Self {
    Self::new(message)
  }
}

impl From<&str> for HookError {
  fn from(message: &str) -> Self {
    Self::new(message)
  }
}

/// The container context passed into every provider hook.
pub trait Core {
  /// Make `name` resolve to `target`.
  fn alias(&mut self, name: &str, target: &str) -> HookResult;

  /// Drop whatever `name` currently resolves to.
  fn remove(&mut self, name: &str) -> HookResult;
}

/// A call recorded by [`MemoryCore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "lowercase")]
pub enum CoreCall {
  Alias { name: String, target: String },
  Remove { name: String },
}

/// In-memory [`Core`] implementation.
#[derive(Debug, Default)]
pub struct MemoryCore {
  aliases: BTreeMap<String, String>,
  calls: Vec<CoreCall>,
}

impl MemoryCore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Resolve an alias committed into this host.
  pub fn resolve(&self, name: &str) -> Option<&str> {
    self.aliases.get(name).map(String::as_str)
  }

  /// Aliases committed into this host, keyed by name.
  pub fn aliases(&self) -> &BTreeMap<String, String> {
    &self.aliases
  }

  /// Every call received, in order.
  pub fn calls(&self) -> &[CoreCall] {
    &self.calls
  }
}

impl Core for MemoryCore {
  fn alias(&mut self, name: &str, target: &str) -> HookResult {
    trace!(alias = name, to = target, "alias");
    self.calls.push(CoreCall::Alias {
      name: name.to_string(),
      target: target.to_string(),
    });

    if name.is_empty() || target.is_empty() {
      return Err(HookError::new("alias name and target must not be empty"));
    }
    if name == target {
      return Err(HookError::new(format!("alias [{}] cannot point at itself", name)));
    }

    self.aliases.insert(name.to_string(), target.to_string());
    Ok(())
  }

  fn remove(&mut self, name: &str) -> HookResult {
    trace!(alias = name, "remove");
    self.calls.push(CoreCall::Remove { name: name.to_string() });
    self.aliases.remove(name);
    Ok(())
  }
}
