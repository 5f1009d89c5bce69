//! Types for registry operations.
//!
//! This module defines the error taxonomy and the observable activation state
//! of a registry.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::host::HookError;
use crate::provider::{ProviderId, ResolveError};
use crate::sort::SortError;

/// The hook that was running when an external fault occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookPhase {
  /// A provider's `register_with`.
  Register,
  /// A provider's `boot_with`.
  Boot,
  /// Committing an alias into the host.
  Alias,
}

impl fmt::Display for HookPhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      HookPhase::Register => "registration",
      HookPhase::Boot => "boot",
      HookPhase::Alias => "alias commit",
    };
    f.write_str(s)
  }
}

/// What a fault is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Subject {
  Provider(ProviderId),
  Alias(String),
}

impl fmt::Display for Subject {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Subject::Provider(id) => write!(f, "provider {}", id),
      Subject::Alias(name) => write!(f, "alias [{}]", name),
    }
  }
}

/// Where the registry is in its boot lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BootState {
  /// `boot()` has not completed and has not failed.
  Pending,
  /// The last `boot()` failed part way; nothing was rolled back.
  PartiallyActivated { failed: Subject },
  /// `boot()` completed.
  Booted,
}

/// Coarse classification of [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Conflict,
  NotFound,
  InvalidArgument,
  IllegalState,
  Overflow,
  Execution,
  Hook,
}

/// Errors returned by registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// A provider answering to this identifier is already registered.
  #[error("provider {0} is already registered")]
  ProviderConflict(ProviderId),

  /// The alias name is already registered.
  #[error("alias [{0}] is already registered")]
  AliasConflict(String),

  /// No registered provider answers to this identifier.
  #[error("provider {0} is not registered")]
  ProviderNotFound(ProviderId),

  /// The alias name is not registered.
  #[error("alias [{0}] is not registered")]
  AliasNotFound(String),

  /// A provider identifier could not be resolved to a valid provider.
  #[error(transparent)]
  InvalidArgument(#[from] ResolveError),

  /// The operation is not allowed once the registry has booted.
  #[error("{operation} cannot be called after boot")]
  IllegalState { operation: &'static str },

  /// No activation order satisfies the declared dependencies.
  #[error("providers cannot be ordered")]
  Overflow(#[from] SortError),

  /// A provider hook or host call failed during registration, boot or alias commit.
  #[error("{subject} failed during {phase}")]
  Execution {
    subject: Subject,
    phase: HookPhase,
    #[source]
    source: HookError,
  },

  /// A teardown hook or host removal failed; passed through unwrapped.
  #[error(transparent)]
  Hook(HookError),
}

impl RegistryError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      RegistryError::ProviderConflict(_) | RegistryError::AliasConflict(_) => ErrorKind::Conflict,
      RegistryError::ProviderNotFound(_) | RegistryError::AliasNotFound(_) => ErrorKind::NotFound,
      RegistryError::InvalidArgument(_) => ErrorKind::InvalidArgument,
      RegistryError::IllegalState { .. } => ErrorKind::IllegalState,
      RegistryError::Overflow(_) => ErrorKind::Overflow,
      RegistryError::Execution { .. } => ErrorKind::Execution,
      RegistryError::Hook(_) => ErrorKind::Hook,
    }
  }

  /// The provider or alias an execution fault is attributed to.
  pub fn subject(&self) -> Option<&Subject> {
    match self {
      RegistryError::Execution { subject, .. } => Some(subject),
      _ => None,
    }
  }

  pub(crate) fn execution(subject: Subject, phase: HookPhase) -> impl FnOnce(HookError) -> Self {
    move |source| RegistryError::Execution { subject, phase, source }
  }
}
