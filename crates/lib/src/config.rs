//! Registry configuration.
//!
//! Configuration can be built in code, deserialized (for example from the
//! `config` object of a manifest), or read from the environment with
//! [`RegistryConfig::from_env`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{REBOOT_ENV, TEARDOWN_ENV};

/// What shutdown does with each teardown failure it collects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeardownPolicy {
  /// Emit a warning per failure.
  #[default]
  Log,
  /// Keep failures in the report only.
  Discard,
}

/// How `boot()` behaves on a registry that already booted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebootPolicy {
  /// Fail with an illegal-state error.
  #[default]
  Reject,
  /// Run the sequence again: the register phase skips registered providers,
  /// the boot phase runs for every provider and every alias is re-committed.
  Rerun,
}

/// Errors reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("invalid value '{value}' for {var} (expected one of: {expected})")]
  InvalidValue {
    var: &'static str,
    value: String,
    expected: &'static str,
  },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownVariant;

impl FromStr for TeardownPolicy {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "log" => Ok(TeardownPolicy::Log),
      "discard" => Ok(TeardownPolicy::Discard),
      _ => Err(UnknownVariant),
    }
  }
}

impl FromStr for RebootPolicy {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "reject" => Ok(RebootPolicy::Reject),
      "rerun" => Ok(RebootPolicy::Rerun),
      _ => Err(UnknownVariant),
    }
  }
}

impl fmt::Display for TeardownPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      TeardownPolicy::Log => "log",
      TeardownPolicy::Discard => "discard",
    })
  }
}

impl fmt::Display for RebootPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      RebootPolicy::Reject => "reject",
      RebootPolicy::Rerun => "rerun",
    })
  }
}

/// Configuration for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
  pub teardown: TeardownPolicy,
  pub reboot: RebootPolicy,
}

impl RegistryConfig {
  /// Defaults overridden by `BOOTREG_TEARDOWN` and `BOOTREG_REBOOT`.
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::default().with_env()
  }

  /// Apply environment overrides on top of `self`.
  pub fn with_env(mut self) -> Result<Self, ConfigError> {
    if let Some(policy) = read_env(TEARDOWN_ENV, "log, discard")? {
      self.teardown = policy;
    }
    if let Some(policy) = read_env(REBOOT_ENV, "reject, rerun")? {
      self.reboot = policy;
    }
    Ok(self)
  }
}

fn read_env<T: FromStr>(var: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError> {
  match std::env::var(var) {
    Ok(value) if value.trim().is_empty() => Ok(None),
    Ok(value) => value
      .parse()
      .map(Some)
      .map_err(|_| ConfigError::InvalidValue { var, value, expected }),
    Err(_) => Ok(None),
  }
}
