//! Per-shop credential storage.
//!
//! Session handling lives outside this crate. Whatever performs the OAuth
//! exchange hands the resulting access token to a [`CredentialStore`], and the
//! REST client reads it back for every request.

use std::collections::HashMap;
use std::sync::RwLock;

/// An Admin API access token.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Access tokens keyed by shop domain.
pub trait CredentialStore: Send + Sync {
    fn get(&self, shop: &str) -> Option<AccessToken>;
    fn set(&self, shop: &str, token: AccessToken);
}

/// Process-local credential store.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    tokens: RwLock<HashMap<String, AccessToken>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with one shop's token.
    pub fn with_token(shop: &str, token: AccessToken) -> Self {
        let store = Self::new();
        store.set(shop, token);
        store
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get(&self, shop: &str) -> Option<AccessToken> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.get(&shop.to_ascii_lowercase()).cloned()
    }

    fn set(&self, shop: &str, token: AccessToken) {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.insert(shop.to_ascii_lowercase(), token);
    }
}
