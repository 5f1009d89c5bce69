//! Best-effort teardown of every registered provider.

use tracing::{debug, info, warn};

use super::Registry;
use crate::config::TeardownPolicy;
use crate::host::{Core, HookError};
use crate::provider::ProviderId;

/// A provider whose unregister hook failed during shutdown.
#[derive(Debug)]
pub struct TeardownFailure {
  pub id: ProviderId,
  pub error: HookError,
}

/// Outcome of [`Registry::shutdown`].
///
/// Every provider appears in exactly one of the two lists.
#[derive(Debug, Default)]
pub struct ShutdownReport {
  pub unregistered: Vec<ProviderId>,
  pub failures: Vec<TeardownFailure>,
}

impl ShutdownReport {
  /// No teardown hook failed.
  pub fn is_clean(&self) -> bool {
    self.failures.is_empty()
  }

  /// Number of providers an unregistration was attempted for.
  pub fn attempted(&self) -> usize {
    self.unregistered.len() + self.failures.len()
  }
}

impl<C: Core> Registry<'_, C> {
  /// Unregister every remaining provider.
  ///
  /// Each provider leaves the collection whether or not its unregister hook
  /// succeeds, and a failure never stops the remaining providers from being
  /// attempted. Failures are collected into the report and, under
  /// [`TeardownPolicy::Log`], also logged.
  pub fn shutdown(&mut self) -> ShutdownReport {
    let entries = std::mem::take(&mut self.entries);
    let mut report = ShutdownReport::default();

    if !entries.is_empty() {
      info!(providers = entries.len(), "shutting down registry");
    }

    for mut entry in entries {
      match entry.provider.unregister_with(&mut *self.core) {
        Ok(()) => {
          debug!(provider = %entry.id, "provider unregistered");
          report.unregistered.push(entry.id);
        }
        Err(error) => {
          if self.config.teardown == TeardownPolicy::Log {
            warn!(provider = %entry.id, error = %error, "provider teardown failed");
          }
          report.failures.push(TeardownFailure { id: entry.id, error });
        }
      }
    }

    report
  }
}

impl<C: Core> Drop for Registry<'_, C> {
  fn drop(&mut self) {
    if !self.entries.is_empty() {
      let _report = self.shutdown();
    }
  }
}
