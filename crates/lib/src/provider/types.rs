use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies a provider type.
///
/// At most one provider per identifier can be registered at a time. The
/// identifier is also the key under which a [`ProviderCatalog`](super::ProviderCatalog)
/// knows how to build a default instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(pub String);

impl ProviderId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProviderId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ProviderId {
  fn from(id: &str) -> Self {
    Self(id.to_string())
  }
}

impl From<String> for ProviderId {
  fn from(id: String) -> Self {
    Self(id)
  }
}

/// Where a provider is in its lifecycle.
///
/// States only move forward during activation; a provider leaves the registry
/// entirely when it is unregistered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationState {
  /// Recorded but its register hook has not run.
  Unregistered,
  /// Register hook completed.
  Registered,
  /// Boot hook completed.
  Booted,
}

impl fmt::Display for ActivationState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ActivationState::Unregistered => "unregistered",
      ActivationState::Registered => "registered",
      ActivationState::Booted => "booted",
    };
    f.write_str(s)
  }
}
