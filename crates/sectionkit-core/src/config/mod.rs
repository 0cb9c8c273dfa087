//! Configuration loading.
//!
//! Two layers are read and merged, project over global:
//! - Global: `<config dir>/sectionkit/sectionkit.toml`
//! - Project: `<project root>/sectionkit.toml`

pub mod merge;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use serde::{Deserialize, Serialize};

pub use merge::merge_configs;
pub use parser::{parse_config_file, parse_config_str, to_toml};
pub use paths::{CONFIG_FILE_NAME, config_path_for_scope, default_global_dir};
pub use schema::{LibraryConfig, ResolvedConfig, SectionkitConfig, ShopConfig};
pub use store::{ConfigStore, load_layered};

/// Configuration layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigScope {
    /// Per-user configuration
    Global,
    /// Configuration next to the project
    Project,
}
