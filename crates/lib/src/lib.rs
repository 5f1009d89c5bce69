//! bootreg-lib: provider registry and two-phase activation engine
//!
//! This crate provides the bootstrap control plane for a modular runtime:
//! - `Provider`: an activatable unit with register/boot/unregister hooks
//! - `Registry`: owns providers and aliases and drives activation
//! - `OrderingResolver`: computes a dependency-consistent activation order
//! - `AliasTable`: logical name to target indirection, committed into the `Core`
//! - `Manifest`: declarative provider sets loaded from JSON

pub mod alias;
pub mod config;
pub mod consts;
pub mod host;
pub mod manifest;
pub mod provider;
pub mod registry;
pub mod sort;

pub use alias::AliasTable;
pub use config::{RebootPolicy, RegistryConfig, TeardownPolicy};
pub use host::{Core, CoreCall, HookError, HookResult, MemoryCore};
pub use provider::{ActivationState, Provider, ProviderCatalog, ProviderContext, ProviderId, ProviderRef};
pub use registry::{BootState, ErrorKind, HookPhase, Registry, RegistryError, ShutdownReport, Subject};
pub use sort::{DependencySorter, OrderingResolver, SortError, SortNode};
