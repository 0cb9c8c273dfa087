//! Per-theme serialization of settings schema writes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::types::ThemeId;

/// Registry of one mutex per (shop, theme).
///
/// The schema merge is a fetch-modify-write against a shared remote asset;
/// holding the theme's lock for the whole cycle keeps two installs in this
/// process from overwriting each other's entry.
#[derive(Debug, Default)]
pub struct SchemaWriteLocks {
    locks: Mutex<HashMap<(String, ThemeId), Arc<Mutex<()>>>>,
}

impl SchemaWriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock handle for one theme; callers hold its guard across the cycle.
    pub fn lock_for(&self, shop: &str, theme_id: ThemeId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry((shop.to_ascii_lowercase(), theme_id))
            .or_default()
            .clone()
    }
}
