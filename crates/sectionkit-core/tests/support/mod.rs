#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;

use sectionkit_core::library::{AssetReader, LibraryRepository, LibraryRoots, PreviewResolver};
use sectionkit_core::theme::{Theme, ThemeApi, ThemeApiError, ThemeRole};
use sectionkit_core::types::ThemeId;

pub const SHOP: &str = "demo.myshopify.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListThemes,
    GetAsset(ThemeId, String),
    PutAsset(ThemeId, String),
}

#[derive(Default)]
struct FakeState {
    themes: Vec<Theme>,
    assets: HashMap<(ThemeId, String), String>,
    failing_puts: HashSet<String>,
    failing_gets: HashSet<String>,
    listing_fails: bool,
    calls: Vec<Call>,
}

/// In-memory theme API with failure injection and a call log.
#[derive(Default)]
pub struct FakeThemeApi {
    state: Mutex<FakeState>,
    /// Delay between reading and answering asset fetches
    latency: Duration,
}

impl FakeThemeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_themes(themes: Vec<Theme>) -> Self {
        let api = Self::new();
        api.state().themes = themes;
        api
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn fail_put(&self, key: &str) {
        self.state().failing_puts.insert(key.to_string());
    }

    pub fn fail_get(&self, key: &str) {
        self.state().failing_gets.insert(key.to_string());
    }

    pub fn fail_listing(&self) {
        self.state().listing_fails = true;
    }

    pub fn set_asset(&self, theme_id: ThemeId, key: &str, value: &str) {
        self.state()
            .assets
            .insert((theme_id, key.to_string()), value.to_string());
    }

    pub fn asset(&self, theme_id: ThemeId, key: &str) -> Option<String> {
        self.state().assets.get(&(theme_id, key.to_string())).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn put_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PutAsset(_, key) => Some(key),
                _ => None,
            })
            .collect()
    }
}

impl ThemeApi for FakeThemeApi {
    fn list_themes(&self, _shop: &str) -> Result<Vec<Theme>, ThemeApiError> {
        let mut state = self.state();
        state.calls.push(Call::ListThemes);
        if state.listing_fails {
            return Err(ThemeApiError::Http {
                status: 502,
                body: "bad gateway".to_string(),
            });
        }
        Ok(state.themes.clone())
    }

    fn get_asset(
        &self,
        _shop: &str,
        theme_id: ThemeId,
        key: &str,
    ) -> Result<Option<String>, ThemeApiError> {
        let value = {
            let mut state = self.state();
            state.calls.push(Call::GetAsset(theme_id, key.to_string()));
            if state.failing_gets.contains(key) {
                return Err(ThemeApiError::Transport("connection reset".to_string()));
            }
            state.assets.get(&(theme_id, key.to_string())).cloned()
        };
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        Ok(value)
    }

    fn put_asset(
        &self,
        _shop: &str,
        theme_id: ThemeId,
        key: &str,
        value: &str,
    ) -> Result<(), ThemeApiError> {
        let mut state = self.state();
        state.calls.push(Call::PutAsset(theme_id, key.to_string()));
        if state.failing_puts.contains(key) {
            return Err(ThemeApiError::Http {
                status: 500,
                body: "internal error".to_string(),
            });
        }
        state
            .assets
            .insert((theme_id, key.to_string()), value.to_string());
        Ok(())
    }
}

pub fn theme(id: ThemeId, name: &str, role: ThemeRole) -> Theme {
    Theme {
        id,
        name: name.to_string(),
        role,
    }
}

/// Temporary library with a fixed number of roots and a preview cache.
pub struct LibraryFixture {
    temp: TempDir,
    roots: Vec<PathBuf>,
}

impl LibraryFixture {
    pub fn new(root_count: usize) -> Self {
        let temp = TempDir::new().unwrap();
        let roots = (0..root_count)
            .map(|i| temp.path().join(format!("root-{}", i)))
            .collect();
        Self { temp, roots }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn root(&self, index: usize) -> &Path {
        &self.roots[index]
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.temp.path().join("preview-cache")
    }

    pub fn library_roots(&self) -> LibraryRoots {
        LibraryRoots::new(self.roots.clone())
    }

    pub fn write_section(&self, root: usize, id: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = self.roots[root].join(id);
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        dir
    }

    pub fn reader(&self) -> AssetReader {
        AssetReader::new(self.library_roots())
    }

    pub fn repository(&self) -> LibraryRepository {
        LibraryRepository::new(self.library_roots(), self.cache_dir())
    }

    pub fn previews(&self) -> PreviewResolver {
        PreviewResolver::new(self.library_roots(), self.cache_dir())
    }
}
