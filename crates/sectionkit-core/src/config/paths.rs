//! Config path resolution helpers.

use std::path::{Path, PathBuf};

use super::ConfigScope;

pub const CONFIG_FILE_NAME: &str = "sectionkit.toml";

pub fn config_path_for_scope(scope: ConfigScope, global_dir: &Path, project_root: &Path) -> PathBuf {
    match scope {
        ConfigScope::Global => global_dir.join(CONFIG_FILE_NAME),
        ConfigScope::Project => project_root.join(CONFIG_FILE_NAME),
    }
}

/// `<config dir>/sectionkit`, if the platform has a config directory.
pub fn default_global_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sectionkit"))
}
