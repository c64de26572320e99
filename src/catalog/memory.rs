//! In-memory catalog, for embedders that already know their agents and for tests.

use super::AgentCatalog;
use crate::agent::key::{AgentKey, ClassKind};
use crate::error::CatalogError;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Catalog backed by maps populated through builder methods.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    provider_classes: BTreeSet<String>,
    /// class -> provider -> type -> metadata
    provider_agents: BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>,
    /// class -> type -> metadata
    simple_agents: BTreeMap<String, BTreeMap<String, String>>,
    meta_programs: HashMap<String, String>,
}

impl MemoryCatalog {
    /// Empty catalog where `ocf` is the only provider-bearing class.
    pub fn new() -> Self {
        Self::default().with_provider_class("ocf")
    }

    pub fn with_provider_class(mut self, class: &str) -> Self {
        self.provider_classes.insert(class.to_string());
        self
    }

    pub fn with_provider_agent(
        mut self,
        class: &str,
        provider: &str,
        agent_type: &str,
        metadata: &str,
    ) -> Self {
        self.provider_classes.insert(class.to_string());
        self.provider_agents
            .entry(class.to_string())
            .or_default()
            .entry(provider.to_string())
            .or_default()
            .insert(agent_type.to_string(), metadata.to_string());
        self
    }

    pub fn with_simple_agent(mut self, class: &str, agent_type: &str, metadata: &str) -> Self {
        self.simple_agents
            .entry(class.to_string())
            .or_default()
            .insert(agent_type.to_string(), metadata.to_string());
        self
    }

    pub fn with_meta_program(mut self, name: &str, metadata: &str) -> Self {
        self.meta_programs
            .insert(name.to_string(), metadata.to_string());
        self
    }
}

impl AgentCatalog for MemoryCatalog {
    fn list_classes(&self) -> Result<BTreeSet<String>, CatalogError> {
        Ok(self
            .provider_agents
            .keys()
            .chain(self.simple_agents.keys())
            .cloned()
            .collect())
    }

    fn class_kind(&self, class: &str) -> ClassKind {
        if self.provider_classes.contains(class) {
            ClassKind::ProviderBearing
        } else {
            ClassKind::Simple
        }
    }

    fn list_providers(&self, class: &str) -> Result<BTreeSet<String>, CatalogError> {
        Ok(self
            .provider_agents
            .get(class)
            .map(|providers| providers.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn list_types(
        &self,
        class: &str,
        provider: Option<&str>,
    ) -> Result<BTreeSet<String>, CatalogError> {
        if let Some(types) = self.simple_agents.get(class) {
            return Ok(types.keys().cloned().collect());
        }
        let Some(providers) = self.provider_agents.get(class) else {
            return Ok(BTreeSet::new());
        };
        Ok(providers
            .iter()
            .filter(|(name, _)| provider.map_or(true, |p| p == name.as_str()))
            .flat_map(|(_, types)| types.keys().cloned())
            .collect())
    }

    fn raw_metadata(&self, key: &AgentKey) -> Result<Option<String>, CatalogError> {
        let found = match key {
            AgentKey::Provider {
                class,
                provider,
                agent_type,
            } => self
                .provider_agents
                .get(class)
                .and_then(|p| p.get(provider))
                .and_then(|t| t.get(agent_type)),
            AgentKey::Simple { class, agent_type } => self
                .simple_agents
                .get(class)
                .and_then(|t| t.get(agent_type)),
            AgentKey::Meta { name } => self.meta_programs.get(name),
        };
        Ok(found.cloned())
    }
}
