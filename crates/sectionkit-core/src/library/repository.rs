//! Create, update, delete and browse sections in the library.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};

use super::preview::{PreviewResolver, ensure_supported};
use super::reader::AssetReader;
use super::{
    LibraryRoots, METADATA_FILE, PreviewUpload, SCHEMA_FILE, SCRIPT_FILE, STYLE_FILE,
    SectionDefinition, SectionMetadata, SectionSummary, SectionUpdate, StoredSection,
    TEMPLATE_FILE, validate_schema_fragment,
};
use crate::error::{Result, SectionError};
use crate::types::{DEFAULT_PRICE, normalize_categories, normalize_slug, validate_section_id};

/// Owner of the on-disk section library.
///
/// No locking is taken: concurrent mutations of the same section race and
/// the last writer wins.
#[derive(Debug, Clone)]
pub struct LibraryRepository {
    roots: LibraryRoots,
    previews: PreviewResolver,
}

impl LibraryRepository {
    pub fn new(roots: LibraryRoots, preview_cache: PathBuf) -> Self {
        let previews = PreviewResolver::new(roots.clone(), preview_cache);
        Self { roots, previews }
    }

    pub fn roots(&self) -> &LibraryRoots {
        &self.roots
    }

    pub fn previews(&self) -> &PreviewResolver {
        &self.previews
    }

    /// Add a new section and return its normalized id.
    pub fn create(&self, definition: SectionDefinition) -> Result<String> {
        let id = normalize_slug(&definition.id);
        if id.trim_matches('-').is_empty() {
            return Err(SectionError::invalid("Section ID is required"));
        }
        validate_section_id(&id)?;
        require_text("title", &definition.title)?;
        require_text("content", &definition.content)?;
        if let Some(fragment) = &definition.schema_fragment {
            validate_schema_fragment(fragment).map_err(SectionError::InvalidRequest)?;
        }
        if let Some(preview) = &definition.preview {
            ensure_supported(preview)?;
        }

        if let Some(existing) = self.roots.find_section_dir(&id) {
            debug!(section = %id, dir = %existing.display(), "Section id already taken");
            return Err(SectionError::AlreadyExists(id));
        }

        let root = self
            .roots
            .writable_root()
            .ok_or_else(|| SectionError::invalid("No library roots configured"))?;
        let dir = root.join(&id);
        // A template-less leftover directory is reused but never removed.
        let fresh = !dir.exists();
        create_dir(&dir)?;

        if let Err(err) = self.write_new_section(&id, &dir, &definition) {
            if fresh {
                if let Err(cleanup) = std::fs::remove_dir_all(&dir) {
                    warn!(section = %id, error = %cleanup, "Failed to clean up partial section");
                }
            }
            return Err(err);
        }

        info!(section = %id, dir = %dir.display(), "Created section");
        Ok(id)
    }

    fn write_new_section(&self, id: &str, dir: &Path, definition: &SectionDefinition) -> Result<()> {
        write_file(&dir.join(TEMPLATE_FILE), &definition.content)?;
        write_companions(
            dir,
            definition.style.as_deref(),
            definition.script.as_deref(),
            definition.schema_fragment.as_ref(),
        )?;

        let now = Utc::now();
        let price = definition
            .price
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PRICE);
        let metadata = SectionMetadata {
            id: id.to_string(),
            title: definition.title.trim().to_string(),
            description: definition.description.trim().to_string(),
            categories: normalize_categories(&definition.categories),
            price: price.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        write_metadata(dir, &metadata)?;

        if let Some(preview) = &definition.preview {
            self.save_preview(id, preview)?;
        }
        Ok(())
    }

    /// Merge an update into an existing section.
    pub fn update(&self, section_id: &str, update: SectionUpdate) -> Result<SectionMetadata> {
        validate_section_id(section_id)?;
        if let Some(title) = &update.title {
            require_text("title", title)?;
        }
        if let Some(content) = &update.content {
            require_text("content", content)?;
        }
        if let Some(fragment) = &update.schema_fragment {
            validate_schema_fragment(fragment).map_err(SectionError::InvalidRequest)?;
        }
        if let Some(preview) = &update.preview {
            ensure_supported(preview)?;
        }

        let dir = self
            .roots
            .find_section_dir(section_id)
            .ok_or_else(|| self.not_found(section_id))?;

        let mut metadata = load_metadata(&dir, section_id);
        if let Some(title) = update.title {
            metadata.title = title.trim().to_string();
        }
        if let Some(description) = update.description {
            metadata.description = description.trim().to_string();
        }
        if let Some(categories) = update.categories {
            metadata.categories = normalize_categories(&categories);
        }
        if let Some(price) = update.price {
            let price = price.trim();
            metadata.price = if price.is_empty() {
                DEFAULT_PRICE.to_string()
            } else {
                price.to_string()
            };
        }
        metadata.updated_at = Some(Utc::now());
        let metadata = metadata.with_defaults(section_id);

        if let Some(content) = &update.content {
            write_file(&dir.join(TEMPLATE_FILE), content)?;
        }
        write_companions(
            &dir,
            update.style.as_deref(),
            update.script.as_deref(),
            update.schema_fragment.as_ref(),
        )?;
        write_metadata(&dir, &metadata)?;

        if let Some(preview) = &update.preview {
            self.save_preview(section_id, preview)?;
        }
        let cache_dir = self.previews.cache_dir_for(section_id);
        if cache_dir.is_dir() {
            write_metadata(&cache_dir, &metadata)?;
        }

        info!(section = section_id, "Updated section");
        Ok(metadata)
    }

    /// Remove a section from every root plus its preview cache.
    ///
    /// Returns `false` when nothing existed.
    pub fn delete(&self, section_id: &str) -> Result<bool> {
        validate_section_id(section_id)?;

        let mut removed = false;
        for dir in self.roots.section_dirs(section_id) {
            std::fs::remove_dir_all(&dir).map_err(|e| SectionError::io(&dir, e))?;
            debug!(section = section_id, dir = %dir.display(), "Removed section directory");
            removed = true;
        }
        if self.previews.remove_cached(section_id)? {
            removed = true;
        }

        if removed {
            info!(section = section_id, "Deleted section");
        } else {
            debug!(section = section_id, "Nothing to delete");
        }
        Ok(removed)
    }

    pub fn get(&self, section_id: &str) -> Result<StoredSection> {
        let files = AssetReader::new(self.roots.clone()).read(section_id)?;
        let metadata = load_metadata(&files.dir, section_id);
        let preview = self.previews.resolve(section_id)?;

        Ok(StoredSection {
            metadata,
            content: files.template,
            has_style: files.dir.join(STYLE_FILE).is_file(),
            has_script: files.dir.join(SCRIPT_FILE).is_file(),
            has_schema: files.dir.join(SCHEMA_FILE).is_file(),
            dir: files.dir,
            preview,
        })
    }

    /// Every section with a template, sorted by id.
    ///
    /// When the same id exists under several roots the earliest root wins.
    pub fn list(&self) -> Result<Vec<SectionSummary>> {
        let mut sections: BTreeMap<String, SectionSummary> = BTreeMap::new();

        for root in self.roots.iter() {
            let entries = match std::fs::read_dir(root) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(root = %root.display(), "Library root does not exist");
                    continue;
                }
                Err(e) => return Err(SectionError::io(root, e)),
            };

            for entry in entries {
                let entry = entry.map_err(|e| SectionError::io(root, e))?;
                let dir = entry.path();
                let Some(id) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if sections.contains_key(&id)
                    || validate_section_id(&id).is_err()
                    || !dir.join(TEMPLATE_FILE).is_file()
                {
                    continue;
                }

                let metadata = load_metadata(&dir, &id);
                let preview = self.previews.resolve(&id)?;
                sections.insert(
                    id.clone(),
                    SectionSummary {
                        id,
                        title: metadata.title,
                        description: metadata.description,
                        categories: metadata.categories,
                        price: metadata.price,
                        preview,
                    },
                );
            }
        }

        Ok(sections.into_values().collect())
    }

    /// Save a preview beside the section and mirror it into the cache.
    pub fn save_preview(&self, section_id: &str, preview: &PreviewUpload) -> Result<PathBuf> {
        let path = self.previews.save(section_id, preview)?;
        self.previews.sync_to_cache(section_id, preview)?;
        Ok(path)
    }

    fn not_found(&self, section_id: &str) -> SectionError {
        SectionError::SectionNotFound {
            section_id: section_id.to_string(),
            attempted: self.roots.iter().map(|root| root.join(section_id)).collect(),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SectionError::invalid(format!(
            "Missing required field: {}",
            field
        )));
    }
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| SectionError::io(dir, e))
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    std::fs::write(path, contents).map_err(|e| SectionError::io(path, e))
}

fn write_companions(
    dir: &Path,
    style: Option<&str>,
    script: Option<&str>,
    schema_fragment: Option<&serde_json::Value>,
) -> Result<()> {
    if let Some(style) = style {
        write_file(&dir.join(STYLE_FILE), style)?;
    }
    if let Some(script) = script {
        write_file(&dir.join(SCRIPT_FILE), script)?;
    }
    if let Some(fragment) = schema_fragment {
        let path = dir.join(SCHEMA_FILE);
        let json = serde_json::to_string_pretty(fragment)
            .map_err(|source| SectionError::Metadata {
                path: path.clone(),
                source,
            })?;
        write_file(&path, json)?;
    }
    Ok(())
}

/// Read `metadata.json`, falling back to defaults when it is missing or broken.
fn load_metadata(dir: &Path, section_id: &str) -> SectionMetadata {
    let path = dir.join(METADATA_FILE);
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            if e.kind() == ErrorKind::NotFound {
                debug!(section = section_id, "No metadata file");
            } else {
                warn!(section = section_id, path = %path.display(), error = %e, "Unreadable metadata");
            }
            return SectionMetadata::placeholder(section_id);
        }
    };
    match serde_json::from_str::<SectionMetadata>(&raw) {
        Ok(metadata) => metadata.with_defaults(section_id),
        Err(e) => {
            warn!(section = section_id, path = %path.display(), error = %e, "Invalid metadata");
            SectionMetadata::placeholder(section_id)
        }
    }
}

fn write_metadata(dir: &Path, metadata: &SectionMetadata) -> Result<()> {
    let path = dir.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(metadata).map_err(|source| SectionError::Metadata {
        path: path.clone(),
        source,
    })?;
    write_file(&path, json)
}
