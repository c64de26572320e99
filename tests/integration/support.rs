use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rakit::catalog::{AgentCatalog, FilesystemCatalog};
use rakit::config::RakitConfig;
use rakit::tooling::cli::CliContext;
use tempfile::TempDir;

/// Metadata advertising `validate-all` and one required parameter.
pub const VALIDATING_METADATA: &str = r#"<?xml version="1.0"?>
<!DOCTYPE resource-agent SYSTEM "ra-api-1.dtd">
<resource-agent name="IPaddr2" version="1.0">
  <version>1.0</version>
  <shortdesc lang="en">Manages virtual IPv4 and IPv6 addresses</shortdesc>
  <longdesc lang="en">This agent manages IP alias addresses.</longdesc>
  <parameters>
    <parameter name="ip" unique="1" required="1">
      <shortdesc lang="en">IPv4 or IPv6 address</shortdesc>
      <content type="string" default=""/>
    </parameter>
  </parameters>
  <actions>
    <action name="start" timeout="20s"/>
    <action name="stop" timeout="20s"/>
    <action name="monitor" timeout="20s" interval="10s" depth="0"/>
    <action name="meta-data" timeout="5s"/>
    <action name="validate-all" timeout="20s"/>
  </actions>
</resource-agent>"#;

/// Metadata without a `validate-all` action.
pub const PLAIN_METADATA: &str = r#"<?xml version="1.0"?>
<resource-agent name="Dummy" version="1.0">
  <shortdesc lang="en">Example stateless resource agent</shortdesc>
  <actions>
    <action name="start" timeout="20s"/>
    <action name="stop" timeout="20s"/>
    <action name="meta-data" timeout="5s"/>
  </actions>
</resource-agent>"#;

/// A throwaway installation: OCF root, LSB init directory, daemon directory.
pub struct AgentTree {
    dir: TempDir,
}

impl AgentTree {
    pub fn new() -> Self {
        let tree = Self {
            dir: TempDir::new().unwrap(),
        };
        fs::create_dir_all(tree.ocf_root().join("resource.d")).unwrap();
        fs::create_dir_all(tree.lsb_dir()).unwrap();
        fs::create_dir_all(tree.daemon_dir()).unwrap();
        tree
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn ocf_root(&self) -> PathBuf {
        self.dir.path().join("ocf")
    }

    pub fn lsb_dir(&self) -> PathBuf {
        self.dir.path().join("init.d")
    }

    pub fn daemon_dir(&self) -> PathBuf {
        self.dir.path().join("daemons")
    }

    /// Install an OCF agent answering `meta-data` with `metadata` and running
    /// `validate_body` for `validate-all`.
    pub fn add_ocf_agent(&self, provider: &str, agent_type: &str, metadata: &str, validate_body: &str) {
        let dir = self.ocf_root().join("resource.d").join(provider);
        fs::create_dir_all(&dir).unwrap();
        let script = format!(
            "#!/bin/sh\ncase \"$1\" in\nmeta-data)\ncat <<'END_OF_METADATA'\n{metadata}\nEND_OF_METADATA\nexit 0\n;;\nvalidate-all)\n{validate_body}\n;;\n*)\nexit 3\n;;\nesac\n"
        );
        write_executable(&dir.join(agent_type), &script);
    }

    pub fn add_lsb_script(&self, name: &str, description: &str) {
        let script = format!(
            "#!/bin/sh\n### BEGIN INIT INFO\n# Provides: {name}\n# Short-Description: {description}\n# Description: {description} daemon\n### END INIT INFO\nexit 0\n"
        );
        write_executable(&self.lsb_dir().join(name), &script);
    }

    pub fn add_daemon(&self, name: &str, metadata: &str) {
        let script = format!(
            "#!/bin/sh\n[ \"$1\" = metadata ] || exit 1\ncat <<'END_OF_METADATA'\n{metadata}\nEND_OF_METADATA\n"
        );
        write_executable(&self.daemon_dir().join(name), &script);
    }

    /// Default configuration pointed at this tree, with stable uncolored output.
    pub fn config(&self) -> RakitConfig {
        let mut config = RakitConfig::default();
        config.paths.ocf_root = self.ocf_root();
        config.paths.lsb_dir = self.lsb_dir();
        config.paths.daemon_dir = self.daemon_dir();
        config.output.regression_tests = true;
        config.output.color = false;
        config
    }

    pub fn catalog(&self) -> Arc<dyn AgentCatalog> {
        let config = self.config();
        Arc::new(FilesystemCatalog::new(
            &config.paths,
            &config.agents,
            &config.catalog,
        ))
    }

    pub fn context(&self) -> CliContext {
        CliContext::with_catalog(self.config(), self.catalog())
    }
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Run `f` with XDG directories inside `temp_dir` so no user config is read.
pub fn with_xdg_env<F, R>(temp_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let original_config = std::env::var("XDG_CONFIG_HOME").ok();
    let original_state = std::env::var("XDG_STATE_HOME").ok();

    std::env::set_var("XDG_CONFIG_HOME", temp_dir.path().join("config"));
    std::env::set_var("XDG_STATE_HOME", temp_dir.path().join("state"));

    let result = f();

    match original_config {
        Some(v) => std::env::set_var("XDG_CONFIG_HOME", v),
        None => std::env::remove_var("XDG_CONFIG_HOME"),
    }
    match original_state {
        Some(v) => std::env::set_var("XDG_STATE_HOME", v),
        None => std::env::remove_var("XDG_STATE_HOME"),
    }
    result
}
