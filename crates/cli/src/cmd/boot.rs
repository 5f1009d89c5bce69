//! Implementation of the `bootreg boot` command.
//!
//! Loads a manifest, registers its providers by identifier against an in-memory
//! host, boots them, and shuts the registry down again. The report shows where
//! every provider ended up, which aliases reached the host, and every hook call.

use std::collections::BTreeMap;
use std::error::Error as _;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use bootreg_lib::manifest::{Journal, JournalEntry, Manifest};
use bootreg_lib::{ActivationState, BootState, MemoryCore, ProviderId, Registry, RegistryError};

use crate::output::{
  OutputFormat, format_duration, print_error, print_info, print_json, print_stat, print_success, print_warning,
  state_label, symbols,
};

#[derive(Serialize)]
struct ProviderStatus {
  id: ProviderId,
  state: ActivationState,
}

#[derive(Serialize)]
struct TeardownStatus {
  id: ProviderId,
  error: String,
}

#[derive(Serialize)]
struct BootSummary {
  boot_state: BootState,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
  elapsed_us: u128,
  providers: Vec<ProviderStatus>,
  aliases: BTreeMap<String, String>,
  journal: Vec<JournalEntry>,
  teardown_failures: Vec<TeardownStatus>,
}

pub fn cmd_boot(path: &Path, output: OutputFormat) -> Result<()> {
  let manifest =
    Manifest::from_path(path).with_context(|| format!("Failed to load manifest: {}", path.display()))?;
  let config = manifest
    .config
    .unwrap_or_default()
    .with_env()
    .context("Invalid registry configuration")?;

  let journal = Journal::new();
  let mut core = MemoryCore::new();

  let (result, mut summary) = {
    let mut registry = Registry::with_config(&mut core, config).with_catalog(manifest.catalog(&journal));
    debug!(config = ?registry.config(), "registry configuration");
    manifest
      .populate(&mut registry)
      .context("Failed to register manifest")?;

    let started = Instant::now();
    let result = registry.boot();
    let elapsed = started.elapsed();

    let providers = registry
      .get_providers()
      .into_iter()
      .filter_map(|id| registry.state_of(&id).map(|state| ProviderStatus { id, state }))
      .collect();
    let boot_state = registry.boot_state();

    let report = registry.shutdown();
    let teardown_failures = report
      .failures
      .into_iter()
      .map(|failure| TeardownStatus {
        id: failure.id,
        error: failure.error.to_string(),
      })
      .collect();

    let summary = BootSummary {
      boot_state,
      error: result.as_ref().err().map(error_chain),
      elapsed_us: elapsed.as_micros(),
      providers,
      aliases: BTreeMap::new(),
      journal: Vec::new(),
      teardown_failures,
    };
    (result.map(|_| elapsed), summary)
  };

  summary.aliases = core.aliases().clone();
  summary.journal = journal.entries();

  if output.is_json() {
    print_json(&summary)?;
  } else {
    print_summary(path, &summary);
  }

  let elapsed = result.with_context(|| format!("Failed to boot {}", path.display()))?;
  if !output.is_json() {
    print_success(&format!("Booted in {}", format_duration(elapsed)));
  }
  Ok(())
}

/// An error and its causes, joined the way `{:#}` renders an `anyhow` chain.
fn error_chain(err: &RegistryError) -> String {
  let mut message = err.to_string();
  let mut source = err.source();
  while let Some(cause) = source {
    message.push_str(": ");
    message.push_str(&cause.to_string());
    source = cause.source();
  }
  message
}

fn print_summary(path: &Path, summary: &BootSummary) {
  print_info(&format!("Providers from {}", path.display()));
  for (position, provider) in summary.providers.iter().enumerate() {
    println!("  {:>3}. {} {}", position + 1, provider.id, state_label(provider.state));
  }

  if !summary.aliases.is_empty() {
    print_info("Aliases");
    for (name, target) in &summary.aliases {
      println!("  {} {} {}", name, symbols::ARROW, target);
    }
  }

  print_stat("hook calls", &summary.journal.len().to_string());

  if let BootState::PartiallyActivated { failed } = &summary.boot_state {
    print_error(&format!("Partially activated: {} failed", failed));
  }

  for failure in &summary.teardown_failures {
    print_warning(&format!("Teardown of {} failed: {}", failure.id, failure.error));
  }
}
