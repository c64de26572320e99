//! Filesystem-backed catalog.
//!
//! Layout:
//! - `ocf`: `<ocf_root>/resource.d/<provider>/<type>`, metadata from `<agent> meta-data`
//! - `lsb`: `<lsb_dir>/<type>`, metadata synthesised from the init script header
//! - meta programs: `<daemon_dir>/<name> metadata`
//!
//! `ocf` is the only class with an on-disk provider layout. Other classes named
//! in `agents.provider_classes` are classified as provider-bearing but list no
//! providers or types here, so names in them resolve to not-found.

use super::{lsb, AgentCatalog};
use crate::agent::key::{AgentKey, ClassKind};
use crate::config::{AgentsConfig, CatalogConfig, PathsConfig};
use crate::error::CatalogError;
use crate::process::{self, StreamMode};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::debug;
use walkdir::WalkDir;

pub const OCF_CLASS: &str = "ocf";
pub const LSB_CLASS: &str = "lsb";

/// Catalog reading installed agents from disk.
#[derive(Debug, Clone)]
pub struct FilesystemCatalog {
    paths: PathsConfig,
    provider_classes: Vec<String>,
    meta_programs: Vec<String>,
    metadata_timeout: Option<Duration>,
}

impl FilesystemCatalog {
    pub fn new(paths: &PathsConfig, agents: &AgentsConfig, catalog: &CatalogConfig) -> Self {
        Self {
            paths: paths.clone(),
            provider_classes: agents.provider_classes.clone(),
            meta_programs: agents.meta_programs.clone(),
            metadata_timeout: catalog.metadata_timeout(),
        }
    }

    /// `<ocf_root>/resource.d`
    pub fn resource_dir(&self) -> PathBuf {
        self.paths.ocf_root.join("resource.d")
    }

    fn ocf_agent_path(&self, provider: &str, agent_type: &str) -> PathBuf {
        self.resource_dir().join(provider).join(agent_type)
    }

    fn run_metadata_command(
        &self,
        agent: &str,
        program: &Path,
        action: &str,
    ) -> Result<String, CatalogError> {
        debug!(agent, program = %program.display(), action, "Fetching agent metadata");
        let mut command = Command::new(program);
        command
            .arg(action)
            .env("OCF_ROOT", &self.paths.ocf_root);

        let run = process::run_captured(command, StreamMode::StdoutOnly, self.metadata_timeout)
            .map_err(|source| CatalogError::Process {
                agent: agent.to_string(),
                source,
            })?;
        if !run.status.success() {
            return Err(CatalogError::MetadataCommand {
                agent: agent.to_string(),
                status: run.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&run.output).into_owned())
    }
}

/// Immediate children of `dir` accepted by `keep`, skipping hidden entries.
///
/// A missing directory yields an empty set.
fn list_entries(
    dir: &Path,
    keep: impl Fn(&walkdir::DirEntry) -> bool,
) -> Result<BTreeSet<String>, CatalogError> {
    if !dir.is_dir() {
        return Ok(BTreeSet::new());
    }
    let mut names = BTreeSet::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|e| CatalogError::Io {
            path: dir.to_path_buf(),
            source: e.into(),
        })?;
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with('.') || !keep(&entry) {
            continue;
        }
        names.insert(name.to_string());
    }
    Ok(names)
}

fn is_file(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file()
}

fn is_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
}

impl AgentCatalog for FilesystemCatalog {
    fn list_classes(&self) -> Result<BTreeSet<String>, CatalogError> {
        let mut classes = BTreeSet::new();
        if self.resource_dir().is_dir() {
            classes.insert(OCF_CLASS.to_string());
        }
        if self.paths.lsb_dir.is_dir() {
            classes.insert(LSB_CLASS.to_string());
        }
        Ok(classes)
    }

    fn class_kind(&self, class: &str) -> ClassKind {
        if self.provider_classes.iter().any(|c| c == class) {
            ClassKind::ProviderBearing
        } else {
            ClassKind::Simple
        }
    }

    fn list_providers(&self, class: &str) -> Result<BTreeSet<String>, CatalogError> {
        // Only `ocf` has a provider directory tree.
        if class != OCF_CLASS {
            return Ok(BTreeSet::new());
        }
        list_entries(&self.resource_dir(), is_dir)
    }

    fn list_types(
        &self,
        class: &str,
        provider: Option<&str>,
    ) -> Result<BTreeSet<String>, CatalogError> {
        match class {
            OCF_CLASS => match provider {
                Some(p) => list_entries(&self.resource_dir().join(p), is_file),
                None => {
                    let mut types = BTreeSet::new();
                    for p in self.list_providers(class)? {
                        types.extend(list_entries(&self.resource_dir().join(&p), is_file)?);
                    }
                    Ok(types)
                }
            },
            LSB_CLASS => list_entries(&self.paths.lsb_dir, is_file),
            _ => Ok(BTreeSet::new()),
        }
    }

    fn raw_metadata(&self, key: &AgentKey) -> Result<Option<String>, CatalogError> {
        match key {
            AgentKey::Provider {
                class,
                provider,
                agent_type,
            } if class == OCF_CLASS => {
                let path = self.ocf_agent_path(provider, agent_type);
                if !path.is_file() {
                    return Ok(None);
                }
                self.run_metadata_command(&key.to_string(), &path, "meta-data")
                    .map(Some)
            }
            AgentKey::Simple { class, agent_type } if class == LSB_CLASS => {
                let path = self.paths.lsb_dir.join(agent_type);
                if !path.is_file() {
                    return Ok(None);
                }
                let bytes = std::fs::read(&path).map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?;
                let script = String::from_utf8_lossy(&bytes);
                Ok(Some(lsb::synthesize_metadata(agent_type, &script)))
            }
            AgentKey::Meta { name } => {
                if !self.meta_programs.iter().any(|m| m == name) {
                    return Ok(None);
                }
                let path = self.paths.daemon_dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                self.run_metadata_command(name, &path, "metadata").map(Some)
            }
            _ => Ok(None),
        }
    }
}
