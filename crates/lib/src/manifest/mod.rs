//! Declarative provider manifests.
//!
//! A manifest lists providers (with the services they provide and require) and
//! aliases in JSON. It can populate a [`Registry`] directly, or produce a
//! [`ProviderCatalog`] so providers are registered by identifier.

mod declared;
mod types;

use std::collections::HashSet;
use std::path::Path;

pub use declared::{DeclaredProvider, Journal, JournalEntry};
pub use types::{HookKind, Manifest, ManifestError, ProviderDecl};

use crate::host::Core;
use crate::provider::ProviderCatalog;
use crate::registry::{Registry, RegistryError};

impl Manifest {
  /// Parse and validate a manifest from JSON.
  pub fn from_json(json: &str) -> Result<Self, ManifestError> {
    let manifest: Manifest = serde_json::from_str(json)?;
    manifest.validate()?;
    Ok(manifest)
  }

  /// Load a manifest from a JSON file.
  pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
    let json = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
      path: path.display().to_string(),
      source,
    })?;
    Self::from_json(&json)
  }

  fn validate(&self) -> Result<(), ManifestError> {
    let mut seen = HashSet::new();
    for decl in &self.providers {
      if !seen.insert(&decl.id) {
        return Err(ManifestError::DuplicateProvider(decl.id.clone()));
      }
    }
    Ok(())
  }

  /// A catalog with one factory per declared provider.
  pub fn catalog(&self, journal: &Journal) -> ProviderCatalog {
    let mut catalog = ProviderCatalog::new();
    for decl in &self.providers {
      let decl = decl.clone();
      let journal = journal.clone();
      catalog.register(decl.id.clone(), move |_| {
        Ok(Box::new(DeclaredProvider::new(decl.clone(), journal.clone())))
      });
    }
    catalog
  }

  /// Register every declared provider (by identifier) and alias.
  ///
  /// The registry must have been built with [`Manifest::catalog`] or a catalog
  /// that knows every declared id.
  pub fn populate<C: Core>(&self, registry: &mut Registry<'_, C>) -> Result<(), RegistryError> {
    for decl in &self.providers {
      registry.register_provider(&decl.id)?;
    }
    for (name, target) in &self.aliases {
      registry.register_alias(name.as_str(), target.as_str())?;
    }
    Ok(())
  }
}
