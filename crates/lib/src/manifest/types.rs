use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RegistryConfig;
use crate::provider::ProviderId;

/// A provider hook, as recorded in a [`Journal`](super::Journal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
  Register,
  Boot,
  Unregister,
}

impl fmt::Display for HookKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      HookKind::Register => "register",
      HookKind::Boot => "boot",
      HookKind::Unregister => "unregister",
    })
  }
}

/// Declaration of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderDecl {
  pub id: ProviderId,

  /// Service names the provider supplies.
  #[serde(default)]
  pub provides: Vec<String>,

  /// Service names that must be supplied by providers activated earlier.
  #[serde(default)]
  pub requires: Vec<String>,

  /// Extra identities the provider answers to.
  #[serde(default)]
  pub capabilities: Vec<ProviderId>,

  /// Aliases the provider commits into the host from its register hook.
  #[serde(default)]
  pub aliases: BTreeMap<String, String>,

  /// Make this hook fail, to rehearse partial activation.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub fail: Option<HookKind>,
}

impl ProviderDecl {
  pub fn new(id: impl Into<ProviderId>) -> Self {
    Self {
      id: id.into(),
      provides: Vec::new(),
      requires: Vec::new(),
      capabilities: Vec::new(),
      aliases: BTreeMap::new(),
      fail: None,
    }
  }

  pub fn provides<I, S>(mut self, services: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.provides.extend(services.into_iter().map(Into::into));
    self
  }

  pub fn requires<I, S>(mut self, services: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.requires.extend(services.into_iter().map(Into::into));
    self
  }

  pub fn failing(mut self, hook: HookKind) -> Self {
    self.fail = Some(hook);
    self
  }
}

/// A declarative set of providers and aliases.
///
/// ```json
/// {
///   "providers": [
///     { "id": "config", "provides": ["config"] },
///     { "id": "db", "provides": ["db"], "requires": ["config"] }
///   ],
///   "aliases": { "database": "db.mysql" },
///   "config": { "teardown": "log" }
/// }
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
  #[serde(default)]
  pub providers: Vec<ProviderDecl>,

  #[serde(default)]
  pub aliases: BTreeMap<String, String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<RegistryConfig>,
}

/// Errors loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {path}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse manifest")]
  Parse(#[from] serde_json::Error),

  /// The same provider id is declared twice.
  #[error("provider {0} is declared more than once")]
  DuplicateProvider(ProviderId),
}
