//! Metadata loading: catalog text to [`AgentMetadata`].

use crate::agent::key::AgentKey;
use crate::agent::metadata::AgentMetadata;
use crate::catalog::AgentCatalog;
use crate::error::LoadError;
use std::sync::Arc;
use tracing::debug;

/// Loads and parses agent metadata on demand. Nothing is cached.
pub struct MetadataLoader {
    catalog: Arc<dyn AgentCatalog>,
}

impl MetadataLoader {
    pub fn new(catalog: Arc<dyn AgentCatalog>) -> Self {
        Self { catalog }
    }

    pub fn load(&self, key: &AgentKey) -> Result<AgentMetadata, LoadError> {
        let raw = self
            .catalog
            .raw_metadata(key)?
            .ok_or_else(|| LoadError::UnknownAgent(key.to_string()))?;

        let metadata = AgentMetadata::parse(&raw).map_err(|reason| LoadError::ParseFailure {
            agent: key.to_string(),
            reason,
        })?;
        debug!(
            agent = %key,
            actions = metadata.actions.len(),
            parameters = metadata.parameters.len(),
            "Loaded agent metadata"
        );
        Ok(metadata)
    }

    /// True iff `metadata` declares `action_name`.
    pub fn supports_action(metadata: &AgentMetadata, action_name: &str) -> bool {
        metadata.supports_action(action_name)
    }
}
