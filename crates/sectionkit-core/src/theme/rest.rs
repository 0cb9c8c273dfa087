//! Admin REST implementation of [`ThemeApi`].
//!
//! Requests go through an async `reqwest` client driven by a runtime owned by
//! this type, so callers see plain blocking calls. Both are created on the
//! first request; a client that is never used costs nothing.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{Theme, ThemeApi, ThemeApiError};
use crate::auth::CredentialStore;
use crate::types::ThemeId;

/// Default Admin API version
pub const DEFAULT_API_VERSION: &str = "2024-10";

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Connection settings for [`RestThemeApi`]
#[derive(Debug, Clone)]
pub struct RestThemeApiConfig {
    /// Admin API version segment, e.g. "2024-10"
    pub api_version: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Replaces `https://<shop>/` as the API origin (used against test servers)
    pub base_url: Option<Url>,
}

impl Default for RestThemeApiConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(30),
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ThemesEnvelope {
    themes: Vec<Theme>,
}

#[derive(Debug, Deserialize)]
struct AssetEnvelope {
    asset: AssetBody,
}

#[derive(Debug, Deserialize)]
struct AssetBody {
    #[serde(default)]
    value: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutAssetEnvelope<'a> {
    asset: PutAssetBody<'a>,
}

#[derive(Debug, Serialize)]
struct PutAssetBody<'a> {
    key: &'a str,
    value: &'a str,
}

/// HTTP client plus the runtime driving it
struct Transport {
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl Transport {
    fn build(config: &RestThemeApiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("sectionkit/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        // Several install threads may block on this runtime at once.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;

        Ok(Self { http, runtime })
    }
}

/// Theme API client for the Admin REST endpoints
pub struct RestThemeApi {
    config: RestThemeApiConfig,
    credentials: Arc<dyn CredentialStore>,
    transport: OnceLock<Result<Transport, String>>,
}

impl std::fmt::Debug for RestThemeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestThemeApi")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RestThemeApi {
    pub fn new(config: RestThemeApiConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            config,
            credentials,
            transport: OnceLock::new(),
        }
    }

    fn transport(&self) -> Result<&Transport, ThemeApiError> {
        self.transport
            .get_or_init(|| {
                debug!("Starting HTTP transport");
                Transport::build(&self.config).map_err(|e| format!("{:#}", e))
            })
            .as_ref()
            .map_err(|e| ThemeApiError::Transport(e.clone()))
    }

    pub fn config(&self) -> &RestThemeApiConfig {
        &self.config
    }

    /// Build an endpoint URL below `/admin/api/<version>/`.
    pub fn endpoint(&self, shop: &str, path: &str) -> Result<Url, ThemeApiError> {
        let origin = match &self.config.base_url {
            Some(base) => base.clone(),
            None => {
                if shop.is_empty() || shop.contains(['/', '?', '#', '@']) {
                    return Err(ThemeApiError::InvalidShop(shop.to_string()));
                }
                Url::parse(&format!("https://{}/", shop))
                    .map_err(|_| ThemeApiError::InvalidShop(shop.to_string()))?
            }
        };
        origin
            .join(&format!("admin/api/{}/{}", self.config.api_version, path))
            .map_err(|e| ThemeApiError::InvalidShop(format!("{}: {}", shop, e)))
    }

    fn token(&self, shop: &str) -> Result<String, ThemeApiError> {
        self.credentials
            .get(shop)
            .map(|token| token.expose().to_string())
            .ok_or_else(|| ThemeApiError::MissingCredentials(shop.to_string()))
    }
}

impl Transport {
    async fn fetch_themes(&self, url: Url, token: String) -> Result<Vec<Theme>, ThemeApiError> {
        let response = self
            .http
            .get(url)
            .header(ACCESS_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response, "themes").await?;

        let envelope: ThemesEnvelope = response
            .json()
            .await
            .map_err(|e| ThemeApiError::Decode(e.to_string()))?;
        Ok(envelope.themes)
    }

    async fn fetch_asset(
        &self,
        url: Url,
        token: String,
        key: &str,
    ) -> Result<Option<String>, ThemeApiError> {
        let response = self
            .http
            .get(url)
            .header(ACCESS_TOKEN_HEADER, token)
            .send()
            .await
            .map_err(transport_error)?;
        let response = match check_status(response, key).await {
            Ok(response) => response,
            Err(ThemeApiError::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };

        let envelope: AssetEnvelope = response
            .json()
            .await
            .map_err(|e| ThemeApiError::Decode(e.to_string()))?;
        envelope
            .asset
            .value
            .map(Some)
            .ok_or_else(|| ThemeApiError::Decode(format!("Asset '{}' has no text value", key)))
    }

    async fn store_asset(
        &self,
        url: Url,
        token: String,
        key: &str,
        value: &str,
    ) -> Result<(), ThemeApiError> {
        let body = PutAssetEnvelope {
            asset: PutAssetBody { key, value },
        };
        let response = self
            .http
            .put(url)
            .header(ACCESS_TOKEN_HEADER, token)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        check_status(response, key).await?;
        Ok(())
    }
}

// URL and credentials are checked before the transport is started.
impl ThemeApi for RestThemeApi {
    fn list_themes(&self, shop: &str) -> Result<Vec<Theme>, ThemeApiError> {
        let url = self.endpoint(shop, "themes.json")?;
        let token = self.token(shop)?;
        debug!(shop, %url, "Listing themes");

        let transport = self.transport()?;
        transport.runtime.block_on(transport.fetch_themes(url, token))
    }

    fn get_asset(
        &self,
        shop: &str,
        theme_id: ThemeId,
        key: &str,
    ) -> Result<Option<String>, ThemeApiError> {
        let mut url = self.endpoint(shop, &format!("themes/{}/assets.json", theme_id))?;
        url.query_pairs_mut().append_pair("asset[key]", key);
        let token = self.token(shop)?;
        debug!(shop, theme = theme_id, key, "Fetching asset");

        let transport = self.transport()?;
        transport
            .runtime
            .block_on(transport.fetch_asset(url, token, key))
    }

    fn put_asset(
        &self,
        shop: &str,
        theme_id: ThemeId,
        key: &str,
        value: &str,
    ) -> Result<(), ThemeApiError> {
        let url = self.endpoint(shop, &format!("themes/{}/assets.json", theme_id))?;
        let token = self.token(shop)?;
        debug!(shop, theme = theme_id, key, bytes = value.len(), "Writing asset");

        let transport = self.transport()?;
        transport
            .runtime
            .block_on(transport.store_asset(url, token, key, value))
    }
}

fn transport_error(err: reqwest::Error) -> ThemeApiError {
    ThemeApiError::Transport(err.to_string())
}

async fn check_status(
    response: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response, ThemeApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 | 403 => Err(ThemeApiError::Unauthorized {
            status: status.as_u16(),
        }),
        404 => Err(ThemeApiError::NotFound(resource.to_string())),
        code => {
            let body = response.text().await.unwrap_or_default();
            Err(ThemeApiError::Http { status: code, body })
        }
    }
}
