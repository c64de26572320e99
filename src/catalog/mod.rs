//! Agent Catalog
//!
//! Read-only view of the installed resource agents: which classes exist,
//! which providers a class has, which types a class/provider carries, and the
//! raw metadata text of a given agent.

pub mod filesystem;
pub mod lsb;
pub mod memory;

pub use filesystem::FilesystemCatalog;
pub use memory::MemoryCatalog;

use crate::agent::key::{AgentKey, ClassKind};
use crate::error::CatalogError;
use std::collections::BTreeSet;

/// Query port over installed agents.
///
/// Sets come back sorted so listings are deterministic.
pub trait AgentCatalog: Send + Sync {
    /// All known agent classes.
    fn list_classes(&self) -> Result<BTreeSet<String>, CatalogError>;

    /// Whether agents of `class` are namespaced by provider.
    fn class_kind(&self, class: &str) -> ClassKind;

    /// Every provider of `class`; empty for simple classes.
    fn list_providers(&self, class: &str) -> Result<BTreeSet<String>, CatalogError>;

    /// Types under `class`, restricted to `provider` when given.
    fn list_types(
        &self,
        class: &str,
        provider: Option<&str>,
    ) -> Result<BTreeSet<String>, CatalogError>;

    /// Raw metadata text for `key`, or `None` when no such agent is installed.
    fn raw_metadata(&self, key: &AgentKey) -> Result<Option<String>, CatalogError>;
}
