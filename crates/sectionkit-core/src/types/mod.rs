//! Shared core types used across library and deployment layers.

use crate::error::{Result, SectionError};

/// Remote theme identifier.
pub type ThemeId = u64;

/// Display price used when none is supplied.
pub const DEFAULT_PRICE: &str = "Free";

/// Normalize a user-supplied section id into a library slug.
///
/// Lowercases the input and replaces anything outside `[a-z0-9-]` with `-`.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Validate a section id used to address an existing section.
///
/// Ids become directory names under the library roots, so anything that
/// could escape a root is rejected.
pub fn validate_section_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(SectionError::invalid("Section ID is required"));
    }
    let valid = id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(SectionError::invalid(format!(
            "Section ID '{}' contains invalid characters",
            id
        )));
    }
    Ok(())
}

/// Build an ordered, de-duplicated category list.
pub fn normalize_categories<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut categories: Vec<String> = Vec::new();
    for category in raw {
        let category = category.as_ref().trim();
        if category.is_empty() || categories.iter().any(|c| c == category) {
            continue;
        }
        categories.push(category.to_string());
    }
    categories
}

/// Split a comma-separated category string.
pub fn parse_categories(raw: &str) -> Vec<String> {
    normalize_categories(raw.split(','))
}
