//! Alias indirection: logical names mapped to concrete targets.
//!
//! The table is passive. Committing aliases into the host [`Core`](crate::Core)
//! is the registry's job, so the table can be built and inspected on its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from alias name to target identifier.
///
/// Uses [`BTreeMap`] so iteration, and therefore the order in which aliases are
/// committed on boot, is deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
  entries: BTreeMap<String, String>,
}

impl AliasTable {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert `name -> target` unless `name` is already present.
  ///
  /// Returns `false` and leaves the table untouched if the name exists.
  pub fn insert(&mut self, name: impl Into<String>, target: impl Into<String>) -> bool {
    let name = name.into();
    if self.entries.contains_key(&name) {
      return false;
    }
    self.entries.insert(name, target.into());
    true
  }

  pub fn remove(&mut self, name: &str) -> Option<String> {
    self.entries.remove(name)
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.entries.get(name).map(String::as_str)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.entries.contains_key(name)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(name, target)| (name.as_str(), target.as_str()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for AliasTable {
  fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
    let mut table = AliasTable::new();
    for (name, target) in iter {
      table.insert(name, target);
    }
    table
  }
}
