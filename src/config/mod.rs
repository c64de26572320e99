//! Configuration
//!
//! Layered configuration for agent paths, resolution policy, validation and
//! logging. Sources are merged by [`merge::service::MergeService`].

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RakitConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Installation roots the filesystem catalog reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// OCF root; agents live in `<ocf_root>/resource.d/<provider>/<type>`
    #[serde(default = "default_ocf_root")]
    pub ocf_root: PathBuf,
    /// Directory holding LSB init scripts
    #[serde(default = "default_lsb_dir")]
    pub lsb_dir: PathBuf,
    /// Directory holding the cluster daemons that expose metadata
    #[serde(default = "default_daemon_dir")]
    pub daemon_dir: PathBuf,
}

fn default_ocf_root() -> PathBuf {
    PathBuf::from("/usr/lib/ocf")
}

fn default_lsb_dir() -> PathBuf {
    PathBuf::from("/etc/init.d")
}

fn default_daemon_dir() -> PathBuf {
    PathBuf::from("/usr/lib/pacemaker")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ocf_root: default_ocf_root(),
            lsb_dir: default_lsb_dir(),
            daemon_dir: default_daemon_dir(),
        }
    }
}

/// Name resolution policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Classes whose agents are namespaced by provider
    #[serde(default = "default_provider_classes")]
    pub provider_classes: Vec<String>,
    /// Pseudo-agents that only expose a metadata document
    #[serde(default = "default_meta_programs")]
    pub meta_programs: Vec<String>,
    /// Provider assumed by the legacy `info <type> <class>` form
    #[serde(default = "default_legacy_provider")]
    pub legacy_provider: String,
}

fn default_provider_classes() -> Vec<String> {
    vec!["ocf".to_string()]
}

fn default_meta_programs() -> Vec<String> {
    ["crmd", "pengine", "stonithd", "cib"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_legacy_provider() -> String {
    "heartbeat".to_string()
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            provider_classes: default_provider_classes(),
            meta_programs: default_meta_programs(),
            legacy_provider: default_legacy_provider(),
        }
    }
}

impl AgentsConfig {
    pub fn is_meta_program(&self, name: &str) -> bool {
        self.meta_programs.iter().any(|m| m == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Upper bound for `meta-data` invocations
    #[serde(default = "default_metadata_timeout_secs")]
    pub metadata_timeout_secs: u64,
}

fn default_metadata_timeout_secs() -> u64 {
    30
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            metadata_timeout_secs: default_metadata_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn metadata_timeout(&self) -> Option<Duration> {
        match self.metadata_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Kill `validate-all` after this many seconds; unset waits forever
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ValidationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Stable one-item-per-line output for regression suites
    #[serde(default)]
    pub regression_tests: bool,
    /// Colorize validation messages in text output
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_color() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            regression_tests: false,
            color: default_color(),
        }
    }
}
