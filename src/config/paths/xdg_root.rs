//! Platform directory utilities (XDG on Linux).

use std::path::PathBuf;

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "rakit")
}

/// Get the global configuration file path
///
/// Returns `$XDG_CONFIG_HOME/rakit/config.toml` on Linux, or the platform
/// equivalent. `None` when no home directory can be determined.
pub fn global_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Get the state directory used for the default log file
///
/// Returns `$XDG_STATE_HOME/rakit` on Linux. Platforms without a state
/// directory fall back to the data-local directory.
pub fn state_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| {
        dirs.state_dir()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| dirs.data_local_dir().to_path_buf())
    })
}
