//! Remote theme access: the consumed asset API and target theme selection.

pub mod resolver;
pub mod rest;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ThemeId;

pub use resolver::ThemeResolver;
pub use rest::{RestThemeApi, RestThemeApiConfig};

/// Asset key of the theme-wide settings schema.
pub const SETTINGS_SCHEMA_KEY: &str = "config/settings_schema.json";

/// Role of a theme within a shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeRole {
    /// The published (active) theme
    Main,
    Unpublished,
    Demo,
    Development,
    /// Any role this crate does not know about
    #[serde(other)]
    Other,
}

/// A theme owned by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub id: ThemeId,
    #[serde(default)]
    pub name: String,
    pub role: ThemeRole,
}

impl Theme {
    pub fn is_main(&self) -> bool {
        self.role == ThemeRole::Main
    }
}

/// Errors reported by a [`ThemeApi`] implementation
#[derive(Error, Debug)]
pub enum ThemeApiError {
    #[error("Invalid shop domain '{0}'")]
    InvalidShop(String),

    #[error("No access token stored for shop '{0}'")]
    MissingCredentials(String),

    #[error("Access denied by theme API (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Theme API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Theme API request failed: {0}")]
    Transport(String),

    #[error("Unexpected theme API response: {0}")]
    Decode(String),
}

/// The remote theme/asset API consumed by the installer.
///
/// Calls are synchronous from the caller's point of view. Implementations
/// must not retry failed writes; the installer reports them as they are.
pub trait ThemeApi: Send + Sync {
    /// List every theme of a shop
    fn list_themes(&self, shop: &str) -> Result<Vec<Theme>, ThemeApiError>;

    /// Read a single asset; `Ok(None)` when the asset does not exist
    fn get_asset(
        &self,
        shop: &str,
        theme_id: ThemeId,
        key: &str,
    ) -> Result<Option<String>, ThemeApiError>;

    /// Create or replace a single asset
    fn put_asset(
        &self,
        shop: &str,
        theme_id: ThemeId,
        key: &str,
        value: &str,
    ) -> Result<(), ThemeApiError>;
}
