//! Filesystem-backed section library.
//!
//! Each section lives in its own directory below one of several candidate
//! library roots:
//!
//! ```text
//! <root>/<section-id>/
//!   section.liquid   (required)
//!   style.css        (optional)
//!   script.js        (optional)
//!   schema.json      (optional)
//!   preview.<ext>    (optional)
//!   metadata.json
//! ```

pub mod preview;
pub mod reader;
pub mod repository;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_PRICE;

pub use preview::{PreviewImage, PreviewRef, PreviewResolver};
pub use reader::{AssetReader, OptionalFile, SectionFiles};
pub use repository::LibraryRepository;

pub const TEMPLATE_FILE: &str = "section.liquid";
pub const STYLE_FILE: &str = "style.css";
pub const SCRIPT_FILE: &str = "script.js";
pub const SCHEMA_FILE: &str = "schema.json";
pub const METADATA_FILE: &str = "metadata.json";

const DEFAULT_DESCRIPTION: &str = "No description available";
const DEFAULT_CATEGORY: &str = "general";

/// Ordered candidate directories that may hold section subdirectories.
///
/// Resolution always walks the roots in the order given here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRoots {
    roots: Vec<PathBuf>,
}

impl LibraryRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// The conventional layout relative to a base directory:
    /// `../sections`, `sections`, `public/sections`.
    pub fn default_for(base: &Path) -> Self {
        Self::new(vec![
            base.join("..").join("sections"),
            base.join("sections"),
            base.join("public").join("sections"),
        ])
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.roots.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First root holding the section, i.e. a `<id>/section.liquid`.
    ///
    /// Directories without a template are not sections and never shadow a
    /// later root.
    pub fn find_section_dir(&self, section_id: &str) -> Option<PathBuf> {
        self.section_dir_candidates(section_id).next()
    }

    /// Every root holding the section, in order.
    pub fn section_dirs(&self, section_id: &str) -> Vec<PathBuf> {
        self.section_dir_candidates(section_id).collect()
    }

    fn section_dir_candidates<'a>(
        &'a self,
        section_id: &'a str,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        self.roots
            .iter()
            .map(move |root| root.join(section_id))
            .filter(|dir| dir.join(TEMPLATE_FILE).is_file())
    }

    /// Root that new sections are written to: the first existing root,
    /// otherwise the first configured one.
    pub fn writable_root(&self) -> Option<&Path> {
        self.roots
            .iter()
            .find(|root| root.is_dir())
            .or_else(|| self.roots.first())
            .map(PathBuf::as_path)
    }
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "lastUpdated", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SectionMetadata {
    /// Metadata for a section that has no usable `metadata.json`.
    pub fn placeholder(section_id: &str) -> Self {
        Self {
            id: section_id.to_string(),
            title: String::new(),
            description: String::new(),
            categories: Vec::new(),
            price: String::new(),
            created_at: None,
            updated_at: None,
        }
        .with_defaults(section_id)
    }

    /// Fill blank fields the way listings display them.
    pub fn with_defaults(mut self, section_id: &str) -> Self {
        if self.id.is_empty() {
            self.id = section_id.to_string();
        }
        if self.title.trim().is_empty() {
            self.title = section_id.to_string();
        }
        if self.description.trim().is_empty() {
            self.description = DEFAULT_DESCRIPTION.to_string();
        }
        if self.categories.is_empty() {
            self.categories = vec![DEFAULT_CATEGORY.to_string()];
        }
        if self.price.trim().is_empty() {
            self.price = DEFAULT_PRICE.to_string();
        }
        self
    }
}

/// An uploaded preview image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewUpload {
    /// Lowercase file extension without the dot
    pub extension: String,
    pub bytes: Vec<u8>,
}

impl PreviewUpload {
    pub fn new(extension: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_ascii_lowercase(),
            bytes,
        }
    }

    /// Take the extension from an uploaded file name.
    pub fn from_file_name(file_name: &str, bytes: Vec<u8>) -> Self {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::new(extension, bytes)
    }

    pub fn file_name(&self) -> String {
        format!("preview.{}", self.extension)
    }
}

/// A complete section as uploaded into the library.
#[derive(Debug, Clone, Default)]
pub struct SectionDefinition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub price: Option<String>,
    pub content: String,
    pub style: Option<String>,
    pub script: Option<String>,
    pub schema_fragment: Option<serde_json::Value>,
    pub preview: Option<PreviewUpload>,
}

/// Partial replacement of an existing section.
///
/// `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct SectionUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub categories: Option<Vec<String>>,
    pub price: Option<String>,
    pub content: Option<String>,
    pub style: Option<String>,
    pub script: Option<String>,
    pub schema_fragment: Option<serde_json::Value>,
    pub preview: Option<PreviewUpload>,
}

/// A section read back from the library.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSection {
    #[serde(flatten)]
    pub metadata: SectionMetadata,
    pub content: String,
    pub has_style: bool,
    pub has_script: bool,
    pub has_schema: bool,
    pub dir: PathBuf,
    pub preview: PreviewRef,
}

/// Browse entry returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub categories: Vec<String>,
    pub price: String,
    pub preview: PreviewRef,
}

/// Check that a schema fragment is an object with a string `name`.
pub fn validate_schema_fragment(fragment: &serde_json::Value) -> Result<&str, String> {
    let object = fragment
        .as_object()
        .ok_or_else(|| "schema fragment must be a JSON object".to_string())?;
    match object.get("name") {
        Some(serde_json::Value::String(name)) if !name.trim().is_empty() => Ok(name),
        _ => Err("schema fragment must have a non-empty string 'name'".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writable_root_prefers_existing_directory() {
        let temp = TempDir::new().unwrap();
        let roots = LibraryRoots::new(vec![temp.path().join("a"), temp.path().join("b")]);
        assert_eq!(roots.writable_root(), Some(temp.path().join("a").as_path()));

        std::fs::create_dir_all(temp.path().join("b")).unwrap();
        assert_eq!(roots.writable_root(), Some(temp.path().join("b").as_path()));
    }

    #[test]
    fn directory_without_template_is_not_a_section() {
        let temp = TempDir::new().unwrap();
        let roots = LibraryRoots::new(vec![temp.path().join("a"), temp.path().join("b")]);
        std::fs::create_dir_all(temp.path().join("a/hero")).unwrap();
        std::fs::create_dir_all(temp.path().join("b/hero")).unwrap();
        assert_eq!(roots.find_section_dir("hero"), None);

        std::fs::write(temp.path().join("b/hero").join(TEMPLATE_FILE), "x").unwrap();
        assert_eq!(roots.find_section_dir("hero"), Some(temp.path().join("b/hero")));
        assert_eq!(roots.section_dirs("hero"), vec![temp.path().join("b/hero")]);
    }

    #[test]
    fn metadata_without_timestamps_omits_them() {
        let mut metadata = SectionMetadata::placeholder("faq-1");
        metadata.created_at = None;
        metadata.updated_at = None;

        let value = serde_json::to_value(&metadata).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("createdAt"));
        assert!(!object.contains_key("updatedAt"));
        assert_eq!(object["title"], "faq-1");
    }

    #[test]
    fn legacy_metadata_gets_defaults() {
        let raw = r#"{"title": "", "lastUpdated": "2024-05-01T10:00:00Z"}"#;
        let metadata: SectionMetadata = serde_json::from_str(raw).unwrap();
        let metadata = metadata.with_defaults("faq-1");

        assert_eq!(metadata.id, "faq-1");
        assert_eq!(metadata.title, "faq-1");
        assert_eq!(metadata.description, DEFAULT_DESCRIPTION);
        assert_eq!(metadata.categories, vec!["general"]);
        assert_eq!(metadata.price, "Free");
        assert!(metadata.updated_at.is_some());
        assert!(metadata.created_at.is_none());
    }

    #[test]
    fn preview_upload_normalizes_extension() {
        let upload = PreviewUpload::from_file_name("Shot.PNG", vec![1, 2]);
        assert_eq!(upload.extension, "png");
        assert_eq!(upload.file_name(), "preview.png");
    }

    #[test]
    fn schema_fragment_requires_name() {
        assert_eq!(
            validate_schema_fragment(&serde_json::json!({"name": "FAQ"})),
            Ok("FAQ")
        );
        assert!(validate_schema_fragment(&serde_json::json!({"settings": []})).is_err());
        assert!(validate_schema_fragment(&serde_json::json!(["FAQ"])).is_err());
    }
}
