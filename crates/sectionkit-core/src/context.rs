//! Application context for dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use crate::auth::{AccessToken, CredentialStore, InMemoryCredentialStore};
use crate::commands::SectionService;
use crate::config::{ConfigScope, ConfigStore, ResolvedConfig, default_global_dir, load_layered};
use crate::deploy::{SchemaWriteLocks, SectionInstaller};
use crate::library::{AssetReader, LibraryRepository, LibraryRoots, PreviewResolver};
use crate::theme::{RestThemeApi, RestThemeApiConfig, ThemeApi, ThemeResolver};

/// Shared configuration and service factory.
///
/// Frontends create this once and build services from it. All installers
/// created from one context share the same schema write locks.
#[derive(Debug, Clone)]
pub struct AppContext {
    project_root: PathBuf,
    global_config_dir: Option<PathBuf>,
    config: ResolvedConfig,
    schema_locks: Arc<SchemaWriteLocks>,
}

impl AppContext {
    /// Load layered configuration for `project_root`.
    pub fn load(project_root: PathBuf) -> anyhow::Result<Self> {
        Self::with_global_config_dir(project_root, default_global_dir())
    }

    /// Load with a custom global config directory (for testing).
    pub fn with_global_config_dir(
        project_root: PathBuf,
        global_config_dir: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let config = load_layered(global_config_dir.as_deref(), &project_root)
            .context("Failed to load sectionkit configuration")?;
        Ok(Self {
            project_root,
            global_config_dir,
            config,
            schema_locks: Arc::new(SchemaWriteLocks::new()),
        })
    }

    /// Build from already resolved settings.
    pub fn from_config(project_root: PathBuf, config: ResolvedConfig) -> Self {
        Self {
            project_root,
            global_config_dir: None,
            config,
            schema_locks: Arc::new(SchemaWriteLocks::new()),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn config_store(&self, scope: ConfigScope) -> anyhow::Result<ConfigStore> {
        let global_dir = match (&self.global_config_dir, scope) {
            (Some(dir), _) => dir.clone(),
            (None, ConfigScope::Project) => PathBuf::new(),
            (None, ConfigScope::Global) => {
                anyhow::bail!("Could not determine config directory")
            }
        };
        Ok(ConfigStore::from_paths(
            scope,
            global_dir,
            self.project_root.clone(),
        ))
    }

    pub fn library_roots(&self) -> LibraryRoots {
        self.config.roots.clone()
    }

    pub fn asset_reader(&self) -> AssetReader {
        AssetReader::new(self.library_roots())
    }

    pub fn preview_resolver(&self) -> PreviewResolver {
        PreviewResolver::new(self.library_roots(), self.config.preview_cache.clone())
    }

    pub fn repository(&self) -> LibraryRepository {
        LibraryRepository::new(self.library_roots(), self.config.preview_cache.clone())
    }

    /// Shop from the argument, else the configured default.
    pub fn shop(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .map(str::trim)
            .filter(|shop| !shop.is_empty())
            .map(str::to_string)
            .or_else(|| self.config.shop_domain.clone())
    }

    /// Credentials seeded from the configured environment variable.
    pub fn credentials_from_env(&self, shop: Option<&str>) -> Arc<dyn CredentialStore> {
        let store = InMemoryCredentialStore::new();
        let var = &self.config.access_token_env;
        match (shop, std::env::var(var)) {
            (Some(shop), Ok(token)) if !token.trim().is_empty() => {
                debug!(shop, env = %var, "Loaded access token from environment");
                store.set(shop, AccessToken::new(token.trim()));
            }
            (Some(shop), _) => {
                warn!(shop, env = %var, "No access token in environment");
            }
            (None, _) => {}
        }
        Arc::new(store)
    }

    /// REST theme API; its HTTP transport starts on the first request.
    pub fn rest_theme_api(&self, credentials: Arc<dyn CredentialStore>) -> Arc<dyn ThemeApi> {
        let config = RestThemeApiConfig {
            api_version: self.config.api_version.clone(),
            timeout: self.config.timeout,
            base_url: None,
        };
        Arc::new(RestThemeApi::new(config, credentials))
    }

    pub fn installer(&self, api: Arc<dyn ThemeApi>) -> SectionInstaller {
        SectionInstaller::new(api, self.asset_reader(), self.schema_locks.clone())
    }

    /// Service wired to an arbitrary theme API.
    pub fn section_service(&self, api: Arc<dyn ThemeApi>) -> SectionService {
        SectionService::new(
            Arc::new(self.repository()),
            Arc::new(self.installer(api.clone())),
            ThemeResolver::new(api),
        )
    }

    /// Service talking to the Admin REST API for `shop`.
    ///
    /// Library-only operations never touch the network, so this is cheap for
    /// commands that do not deploy.
    pub fn rest_section_service(&self, shop: Option<&str>) -> SectionService {
        let credentials = self.credentials_from_env(shop);
        self.section_service(self.rest_theme_api(credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_project_layer_without_global_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("sectionkit.toml"),
            "[library]\nroots = [\"lib\"]\n\n[shop]\ndomain = \"demo.myshopify.com\"\n",
        )
        .unwrap();

        let ctx = AppContext::with_global_config_dir(temp.path().to_path_buf(), None).unwrap();
        assert_eq!(ctx.library_roots().as_slice(), &[temp.path().join("lib")]);
        assert_eq!(ctx.shop(None).as_deref(), Some("demo.myshopify.com"));
        assert_eq!(ctx.shop(Some("other.myshopify.com")).as_deref(), Some("other.myshopify.com"));
    }

    #[test]
    fn rest_service_serves_library_without_network() {
        let temp = TempDir::new().unwrap();
        let section = temp.path().join("sections/hero");
        std::fs::create_dir_all(&section).unwrap();
        std::fs::write(section.join("section.liquid"), "hero").unwrap();

        let ctx = AppContext::with_global_config_dir(temp.path().to_path_buf(), None).unwrap();
        let service = ctx.rest_section_service(None);

        let sections = service.list_sections().unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, "hero");
        assert!(service.generate_placeholder("hero").unwrap());
    }

    #[test]
    fn global_store_requires_config_dir() {
        let temp = TempDir::new().unwrap();
        let ctx = AppContext::with_global_config_dir(temp.path().to_path_buf(), None).unwrap();
        assert!(ctx.config_store(ConfigScope::Global).is_err());
        assert!(ctx.config_store(ConfigScope::Project).is_ok());
    }
}
