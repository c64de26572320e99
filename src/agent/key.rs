//! Agent identity: class kinds and canonical agent keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether agents of a class live under a provider sub-namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    /// `class:provider:type`, e.g. `ocf:heartbeat:IPaddr2`
    ProviderBearing,
    /// `class:type`, e.g. `lsb:nginx`
    Simple,
}

/// Canonical identifier of a resource agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentKey {
    Provider {
        class: String,
        provider: String,
        agent_type: String,
    },
    Simple {
        class: String,
        agent_type: String,
    },
    /// Built-in metadata-only target such as a cluster daemon.
    Meta { name: String },
}

impl AgentKey {
    pub fn provider(
        class: impl Into<String>,
        provider: impl Into<String>,
        agent_type: impl Into<String>,
    ) -> Self {
        AgentKey::Provider {
            class: class.into(),
            provider: provider.into(),
            agent_type: agent_type.into(),
        }
    }

    pub fn simple(class: impl Into<String>, agent_type: impl Into<String>) -> Self {
        AgentKey::Simple {
            class: class.into(),
            agent_type: agent_type.into(),
        }
    }

    pub fn meta(name: impl Into<String>) -> Self {
        AgentKey::Meta { name: name.into() }
    }

    /// Class name; for meta targets this is the program name.
    pub fn class(&self) -> &str {
        match self {
            AgentKey::Provider { class, .. } | AgentKey::Simple { class, .. } => class,
            AgentKey::Meta { name } => name,
        }
    }

    pub fn provider_name(&self) -> Option<&str> {
        match self {
            AgentKey::Provider { provider, .. } => Some(provider),
            _ => None,
        }
    }

    pub fn agent_type(&self) -> Option<&str> {
        match self {
            AgentKey::Provider { agent_type, .. } | AgentKey::Simple { agent_type, .. } => {
                Some(agent_type)
            }
            AgentKey::Meta { .. } => None,
        }
    }

    pub fn is_meta(&self) -> bool {
        matches!(self, AgentKey::Meta { .. })
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentKey::Provider {
                class,
                provider,
                agent_type,
            } => write!(f, "{}:{}:{}", class, provider, agent_type),
            AgentKey::Simple { class, agent_type } => write!(f, "{}:{}", class, agent_type),
            AgentKey::Meta { name } => write!(f, "{}", name),
        }
    }
}
