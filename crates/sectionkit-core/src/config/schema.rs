//! Configuration schema for sectionkit.toml
//!
//! The same structure is used for both layers:
//! - Global: ~/.config/sectionkit/sectionkit.toml
//! - Project: ./sectionkit.toml
//!
//! Every field is optional in a layer; [`SectionkitConfig::resolve`] fills in
//! defaults once the layers are merged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::library::LibraryRoots;
use crate::theme::rest::DEFAULT_API_VERSION;

pub const DEFAULT_PREVIEW_CACHE: &str = "public/section-previews";
pub const DEFAULT_ACCESS_TOKEN_ENV: &str = "SHOPIFY_ACCESS_TOKEN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Root configuration structure for sectionkit.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionkitConfig {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub shop: ShopConfig,
}

/// Where sections and cached previews live
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Candidate library roots in resolution order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roots: Option<Vec<PathBuf>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_cache: Option<PathBuf>,
}

/// Store connection settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Default shop domain, e.g. "example.myshopify.com"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    /// Environment variable holding the admin access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_env: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub roots: LibraryRoots,
    pub preview_cache: PathBuf,
    pub shop_domain: Option<String>,
    pub api_version: String,
    pub access_token_env: String,
    pub timeout: Duration,
}

impl SectionkitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the values a layer sets.
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(roots) = &self.library.roots {
            if roots.is_empty() {
                bail!("library.roots must list at least one directory");
            }
            if roots.iter().any(|root| root.as_os_str().is_empty()) {
                bail!("library.roots contains an empty path");
            }
        }
        if let Some(version) = &self.shop.api_version {
            if version.trim().is_empty() {
                bail!("shop.api_version must not be empty");
            }
        }
        if let Some(var) = &self.shop.access_token_env {
            if var.trim().is_empty() {
                bail!("shop.access_token_env must not be empty");
            }
        }
        if self.shop.timeout_secs == Some(0) {
            bail!("shop.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Apply defaults; relative library paths resolve against `project_root`.
    pub fn resolve(&self, project_root: &Path) -> ResolvedConfig {
        let roots = match &self.library.roots {
            Some(roots) => LibraryRoots::new(
                roots
                    .iter()
                    .map(|root| absolutize(project_root, root))
                    .collect(),
            ),
            None => LibraryRoots::default_for(project_root),
        };
        let preview_cache = self
            .library
            .preview_cache
            .as_deref()
            .map(|path| absolutize(project_root, path))
            .unwrap_or_else(|| project_root.join(DEFAULT_PREVIEW_CACHE));

        ResolvedConfig {
            roots,
            preview_cache,
            shop_domain: self
                .shop
                .domain
                .as_deref()
                .map(str::trim)
                .filter(|domain| !domain.is_empty())
                .map(str::to_string),
            api_version: self
                .shop
                .api_version
                .clone()
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            access_token_env: self
                .shop
                .access_token_env
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCESS_TOKEN_ENV.to_string()),
            timeout: Duration::from_secs(self.shop.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
