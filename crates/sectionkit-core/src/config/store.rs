//! Config store for loading and saving sectionkit.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use super::merge::merge_configs;
use super::paths::{config_path_for_scope, default_global_dir};
use super::schema::ResolvedConfig;
use super::{ConfigScope, SectionkitConfig, parser};

/// One configuration layer on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    scope: ConfigScope,
    config_path: PathBuf,
    project_root: PathBuf,
}

impl ConfigStore {
    pub fn from_scope(scope: ConfigScope) -> anyhow::Result<Self> {
        let global_dir =
            default_global_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        let project_root = std::env::current_dir().context("Failed to read current directory")?;

        Ok(Self::from_paths(scope, global_dir, project_root))
    }

    pub fn from_paths(scope: ConfigScope, global_dir: PathBuf, project_root: PathBuf) -> Self {
        let config_path = config_path_for_scope(scope, &global_dir, &project_root);
        Self {
            scope,
            config_path,
            project_root,
        }
    }

    pub fn scope(&self) -> ConfigScope {
        self.scope
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// A missing file is an empty layer.
    pub fn load(&self) -> anyhow::Result<SectionkitConfig> {
        if !self.config_path.exists() {
            return Ok(SectionkitConfig::new());
        }
        parser::parse_config_file(&self.config_path)
    }

    pub fn save(&self, config: &SectionkitConfig) -> anyhow::Result<()> {
        config.validate().context("Refusing to save invalid configuration")?;
        let content = parser::to_toml(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

/// Load global then project layers and resolve them against `project_root`.
///
/// Without a global directory only the project layer is read.
pub fn load_layered(global_dir: Option<&Path>, project_root: &Path) -> anyhow::Result<ResolvedConfig> {
    let global = match global_dir {
        Some(dir) => ConfigStore::from_paths(
            ConfigScope::Global,
            dir.to_path_buf(),
            project_root.to_path_buf(),
        )
        .load()?,
        None => SectionkitConfig::new(),
    };
    let project = ConfigStore::from_paths(
        ConfigScope::Project,
        global_dir.map(Path::to_path_buf).unwrap_or_default(),
        project_root.to_path_buf(),
    )
    .load()?;

    let merged = merge_configs(&global, &project);
    let resolved = merged.resolve(project_root);
    debug!(
        roots = ?resolved.roots.as_slice(),
        preview_cache = %resolved.preview_cache.display(),
        "Loaded configuration"
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::from_paths(
            ConfigScope::Global,
            temp.path().join("global"),
            temp.path().join("project"),
        );
        assert_eq!(store.load().unwrap(), SectionkitConfig::new());

        let mut config = SectionkitConfig::new();
        config.shop.domain = Some("demo.myshopify.com".to_string());
        store.save(&config).unwrap();

        assert!(store.config_path().ends_with("global/sectionkit.toml"));
        assert_eq!(store.load().unwrap(), config);
    }

    #[test]
    fn project_layer_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");
        let project_root = temp.path().join("project");

        let mut global = SectionkitConfig::new();
        global.shop.domain = Some("global.myshopify.com".to_string());
        global.shop.timeout_secs = Some(5);
        ConfigStore::from_paths(ConfigScope::Global, global_dir.clone(), project_root.clone())
            .save(&global)
            .unwrap();

        let mut project = SectionkitConfig::new();
        project.shop.domain = Some("project.myshopify.com".to_string());
        ConfigStore::from_paths(ConfigScope::Project, global_dir.clone(), project_root.clone())
            .save(&project)
            .unwrap();

        let resolved = load_layered(Some(&global_dir), &project_root).unwrap();
        assert_eq!(resolved.shop_domain.as_deref(), Some("project.myshopify.com"));
        assert_eq!(resolved.timeout.as_secs(), 5);
    }
}
