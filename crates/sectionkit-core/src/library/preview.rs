//! Preview image lookup, persistence and placeholder synthesis.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use tracing::{debug, warn};

use super::{LibraryRoots, PreviewUpload};
use crate::error::{Result, SectionError};
use crate::types::validate_section_id;

/// Recognised preview extensions, in lookup order.
pub const PREVIEW_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "svg", "gif"];

const PLACEHOLDER_CAPTION: &str = "Preview coming soon";
const PLACEHOLDER_FILE: &str = "preview.svg";
const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Where a section's preview comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewRef {
    /// Image stored beside the section
    File { path: PathBuf },
    /// Previously synced copy in the public preview cache
    Cached { path: PathBuf },
    /// Nothing on disk; a placeholder is rendered
    Placeholder,
}

/// Preview bytes ready to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct PreviewResolver {
    roots: LibraryRoots,
    cache_dir: PathBuf,
}

impl PreviewResolver {
    pub fn new(roots: LibraryRoots, cache_dir: PathBuf) -> Self {
        Self { roots, cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache directory for one section.
    pub fn cache_dir_for(&self, section_id: &str) -> PathBuf {
        self.cache_dir.join(section_id)
    }

    pub fn resolve(&self, section_id: &str) -> Result<PreviewRef> {
        validate_section_id(section_id)?;

        if let Some(path) = self
            .roots
            .find_section_dir(section_id)
            .and_then(|dir| find_preview_in(&dir))
        {
            return Ok(PreviewRef::File { path });
        }
        if let Some(path) = find_preview_in(&self.cache_dir_for(section_id)) {
            return Ok(PreviewRef::Cached { path });
        }
        Ok(PreviewRef::Placeholder)
    }

    /// Load preview bytes, falling back to the placeholder.
    pub fn load(&self, section_id: &str) -> Result<PreviewImage> {
        let path = match self.resolve(section_id)? {
            PreviewRef::File { path } | PreviewRef::Cached { path } => path,
            PreviewRef::Placeholder => return Ok(placeholder_image(section_id)),
        };

        let content_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(content_type_for)
            .unwrap_or("application/octet-stream");
        match std::fs::read(&path) {
            Ok(bytes) => Ok(PreviewImage {
                bytes,
                content_type,
            }),
            Err(e) => {
                warn!(section = section_id, path = %path.display(), error = %e, "Preview unreadable, serving placeholder");
                Ok(placeholder_image(section_id))
            }
        }
    }

    /// Store a preview beside the section, replacing earlier previews.
    pub fn save(&self, section_id: &str, upload: &PreviewUpload) -> Result<PathBuf> {
        validate_section_id(section_id)?;
        ensure_supported(upload)?;
        let dir = self.require_section_dir(section_id)?;

        let path = write_preview(&dir, upload)?;
        debug!(section = section_id, path = %path.display(), "Saved preview");
        Ok(path)
    }

    /// Store a preview sent as a `data:image/...;base64,` URL.
    pub fn save_data_url(&self, section_id: &str, data_url: &str) -> Result<PathBuf> {
        let upload = decode_data_url(data_url)?;
        self.save(section_id, &upload)
    }

    /// Write the placeholder beside the section unless a preview exists.
    ///
    /// Returns `true` when a file was written.
    pub fn generate_placeholder(&self, section_id: &str) -> Result<bool> {
        validate_section_id(section_id)?;
        let dir = self.require_section_dir(section_id)?;
        if find_preview_in(&dir).is_some() {
            debug!(section = section_id, "Preview already exists");
            return Ok(false);
        }

        let path = dir.join(PLACEHOLDER_FILE);
        std::fs::write(&path, placeholder_svg(section_id)).map_err(|e| SectionError::io(&path, e))?;
        debug!(section = section_id, path = %path.display(), "Generated placeholder preview");
        Ok(true)
    }

    /// Copy an uploaded preview into the public cache.
    pub fn sync_to_cache(&self, section_id: &str, upload: &PreviewUpload) -> Result<PathBuf> {
        ensure_supported(upload)?;
        let dir = self.cache_dir_for(section_id);
        std::fs::create_dir_all(&dir).map_err(|e| SectionError::io(&dir, e))?;
        write_preview(&dir, upload)
    }

    /// Remove the cache directory of a section. Missing is not an error.
    pub fn remove_cached(&self, section_id: &str) -> Result<bool> {
        let dir = self.cache_dir_for(section_id);
        if !dir.exists() {
            return Ok(false);
        }
        std::fs::remove_dir_all(&dir).map_err(|e| SectionError::io(&dir, e))?;
        Ok(true)
    }

    fn require_section_dir(&self, section_id: &str) -> Result<PathBuf> {
        self.roots
            .find_section_dir(section_id)
            .ok_or_else(|| SectionError::SectionNotFound {
                section_id: section_id.to_string(),
                attempted: self.roots.iter().map(|root| root.join(section_id)).collect(),
            })
    }
}

/// First `preview.<ext>` in a directory, by extension priority.
pub(crate) fn find_preview_in(dir: &Path) -> Option<PathBuf> {
    PREVIEW_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("preview.{}", ext)))
        .find(|path| path.is_file())
}

pub fn content_type_for(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "svg" => Some(SVG_CONTENT_TYPE),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

/// "hero-banner" -> "Hero Banner"
pub fn title_case(section_id: &str) -> String {
    section_id
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic SVG placeholder for a section.
pub fn placeholder_svg(section_id: &str) -> String {
    let title = escape_xml(&title_case(section_id));
    format!(
        concat!(
            "<svg width=\"800\" height=\"600\" viewBox=\"0 0 800 600\" xmlns=\"http://www.w3.org/2000/svg\">\n",
            "  <rect width=\"800\" height=\"600\" fill=\"#f8f8f8\"/>\n",
            "  <rect x=\"50\" y=\"50\" width=\"700\" height=\"500\" rx=\"10\" fill=\"#ffffff\" stroke=\"#e0e0e0\" stroke-width=\"2\"/>\n",
            "  <text x=\"400\" y=\"290\" font-family=\"Arial, sans-serif\" font-size=\"32\" font-weight=\"bold\" text-anchor=\"middle\" fill=\"#333333\">{title}</text>\n",
            "  <text x=\"400\" y=\"340\" font-family=\"Arial, sans-serif\" font-size=\"18\" text-anchor=\"middle\" fill=\"#666666\">{caption}</text>\n",
            "</svg>\n"
        ),
        title = title,
        caption = PLACEHOLDER_CAPTION,
    )
}

fn placeholder_image(section_id: &str) -> PreviewImage {
    PreviewImage {
        bytes: placeholder_svg(section_id).into_bytes(),
        content_type: SVG_CONTENT_TYPE,
    }
}

/// Decode a base64 data URL. A bare base64 payload is taken as PNG.
pub fn decode_data_url(data_url: &str) -> Result<PreviewUpload> {
    let data_url = data_url.trim();
    let (extension, payload) = match data_url.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| SectionError::invalid("Malformed data URL"))?;
            let params = header
                .strip_suffix(";base64")
                .ok_or_else(|| SectionError::invalid("Only base64 data URLs are supported"))?;
            // Parameters such as `;charset=utf-8` may follow the type.
            let mime = params.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            let extension = match mime.as_str() {
                "image/png" => "png",
                "image/jpeg" | "image/jpg" => "jpg",
                "image/svg+xml" => "svg",
                "image/gif" => "gif",
                other => {
                    return Err(SectionError::invalid(format!(
                        "Unsupported preview type '{}'",
                        other
                    )));
                }
            };
            (extension, payload)
        }
        None => ("png", data_url),
    };

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| SectionError::invalid(format!("Invalid base64 image data: {}", e)))?;
    if bytes.is_empty() {
        return Err(SectionError::invalid("Image data is empty"));
    }
    Ok(PreviewUpload::new(extension, bytes))
}

/// Encode an upload as a base64 data URL.
pub fn encode_data_url(upload: &PreviewUpload) -> Result<String> {
    ensure_supported(upload)?;
    let mime = content_type_for(&upload.extension).unwrap_or("image/png");
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&upload.bytes)))
}

pub(crate) fn ensure_supported(upload: &PreviewUpload) -> Result<()> {
    if !PREVIEW_EXTENSIONS.contains(&upload.extension.as_str()) {
        return Err(SectionError::invalid(format!(
            "Unsupported preview extension '{}'",
            upload.extension
        )));
    }
    Ok(())
}

fn write_preview(dir: &Path, upload: &PreviewUpload) -> Result<PathBuf> {
    for ext in PREVIEW_EXTENSIONS {
        let stale = dir.join(format!("preview.{}", ext));
        if stale.is_file() {
            std::fs::remove_file(&stale).map_err(|e| SectionError::io(&stale, e))?;
        }
    }
    let path = dir.join(upload.file_name());
    std::fs::write(&path, &upload.bytes).map_err(|e| SectionError::io(&path, e))?;
    Ok(path)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
