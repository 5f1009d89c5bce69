//! Implementation of the `bootreg order` command.
//!
//! Resolves the activation order of a manifest's providers without running any
//! hooks.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use bootreg_lib::manifest::Manifest;
use bootreg_lib::{DependencySorter, OrderingResolver, ProviderId, SortNode};

use crate::output::{OutputFormat, print_info, print_json, symbols};

#[derive(Serialize)]
struct OrderEntry<'a> {
  position: usize,
  id: &'a ProviderId,
  provides: &'a [String],
  requires: &'a [String],
}

pub fn cmd_order(path: &Path, output: OutputFormat) -> Result<()> {
  let manifest =
    Manifest::from_path(path).with_context(|| format!("Failed to load manifest: {}", path.display()))?;

  let nodes: Vec<SortNode<'_>> = manifest
    .providers
    .iter()
    .map(|decl| SortNode {
      id: &decl.id,
      provides: &decl.provides,
      requires: &decl.requires,
    })
    .collect();

  let order = DependencySorter::new()
    .order(&nodes)
    .context("Failed to order providers")?;

  let entries: Vec<OrderEntry<'_>> = order
    .iter()
    .enumerate()
    .map(|(position, &pos)| OrderEntry {
      position: position + 1,
      id: nodes[pos].id,
      provides: nodes[pos].provides,
      requires: nodes[pos].requires,
    })
    .collect();

  if output.is_json() {
    return print_json(&entries);
  }

  print_info(&format!("Activation order for {}", path.display()));
  for entry in &entries {
    if entry.requires.is_empty() {
      println!("  {:>3}. {}", entry.position, entry.id);
    } else {
      println!(
        "  {:>3}. {} {} {}",
        entry.position,
        entry.id,
        symbols::ARROW,
        entry.requires.join(", ")
      );
    }
  }

  Ok(())
}
