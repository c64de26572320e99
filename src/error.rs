//! Error types for the resource agent toolkit.
//!
//! Each stage of the pipeline owns its own error enum; `ApiError` is the
//! command-level union the CLI reports.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures while querying the agent catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata command for {agent} exited with status {status}")]
    MetadataCommand { agent: String, status: String },

    #[error("metadata command for {agent} failed: {source}")]
    Process {
        agent: String,
        #[source]
        source: crate::process::ProcessError,
    },
}

/// Failures turning a user-supplied name into an `AgentKey`.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("no resource agent matches '{0}'")]
    NotFound(String),

    #[error("resource agent '{name}' is ambiguous, candidates: {}", candidates.join(", "))]
    Ambiguous {
        name: String,
        candidates: Vec<String>,
    },

    #[error("malformed agent name '{name}': {reason}")]
    MalformedInput { name: String, reason: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Failures loading an agent's metadata document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unknown resource agent {0}")]
    UnknownAgent(String),

    #[error("failed to parse metadata of {agent}: {reason}")]
    ParseFailure { agent: String, reason: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Failures invoking an agent's validation action.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("only provider-bearing agents can be validated, got {0}")]
    UnsupportedClass(String),

    #[error("{action} action not supported by agent {agent}")]
    UnsupportedAction { agent: String, action: String },

    #[error("failed to start {}: {source}", path.display())]
    SpawnFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{agent} did not finish within {}s and was killed", after.as_secs())]
    TimedOut { agent: String, after: Duration },

    #[error("I/O error capturing output of {agent}: {source}")]
    Io {
        agent: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Command-level error surfaced by the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("class {0} does not exist")]
    UnknownClass(String),

    #[error("there is no provider {provider} for class {class}")]
    UnknownProvider { class: String, provider: String },

    #[error("invalid parameter '{0}', expected <key>=<value>")]
    InvalidParameter(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),
}
