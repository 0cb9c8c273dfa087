//! Request payloads accepted by [`SectionService`](super::SectionService).
//!
//! Every request rejects unknown fields and is validated before any work is
//! done; problems surface as [`SectionError::InvalidRequest`].

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::deploy::InstallRequest;
use crate::error::{Result, SectionError};
use crate::library::preview::decode_data_url;
use crate::library::{SectionDefinition, SectionUpdate};
use crate::types::{ThemeId, normalize_categories, parse_categories};

/// Parse a JSON request body.
pub fn parse_request<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| SectionError::invalid(format!("Malformed request: {}", e)))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct InstallSectionRequest {
    #[serde(default)]
    pub shop: String,
    #[serde(default)]
    pub section_id: String,
    #[serde(default, deserialize_with = "theme_id_from_number_or_string")]
    pub theme_id: Option<ThemeId>,
}

impl InstallSectionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.shop.trim().is_empty() || self.section_id.trim().is_empty() {
            return Err(SectionError::invalid("Shop and section ID are required"));
        }
        Ok(())
    }

    pub fn into_install_request(self) -> Result<InstallRequest> {
        self.validate()?;
        Ok(InstallRequest {
            shop: self.shop.trim().to_string(),
            section_id: self.section_id.trim().to_string(),
            theme_id: self.theme_id,
        })
    }
}

/// Categories sent either as a list or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CategoriesInput {
    List(Vec<String>),
    Text(String),
}

impl CategoriesInput {
    pub fn into_categories(self) -> Vec<String> {
        match self {
            Self::List(list) => normalize_categories(list),
            Self::Text(text) => parse_categories(&text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UploadSectionRequest {
    /// Requested id; normalized to a slug on create
    #[serde(default, alias = "id")]
    pub section_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<CategoriesInput>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    /// Schema fragment as an object or as JSON text
    #[serde(default)]
    pub schema: Option<Value>,
    /// `data:image/...;base64,` URL
    #[serde(default)]
    pub preview_image: Option<String>,
}

impl UploadSectionRequest {
    pub fn validate(&self) -> Result<()> {
        if self.section_id.trim().is_empty()
            || self.title.trim().is_empty()
            || self.content.trim().is_empty()
        {
            return Err(SectionError::invalid(
                "Section ID, title, and content are required",
            ));
        }
        Ok(())
    }

    pub fn into_definition(self) -> Result<SectionDefinition> {
        self.validate()?;
        Ok(SectionDefinition {
            id: self.section_id,
            title: self.title,
            description: self.description.unwrap_or_default(),
            categories: self
                .categories
                .map(CategoriesInput::into_categories)
                .unwrap_or_default(),
            price: self.price,
            content: self.content,
            style: non_blank(self.style),
            script: non_blank(self.script),
            schema_fragment: self.schema.map(schema_from_input).transpose()?.flatten(),
            preview: non_blank(self.preview_image)
                .map(|data| decode_data_url(&data))
                .transpose()?,
        })
    }
}

/// Partial update; omitted fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateSectionRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Option<CategoriesInput>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub schema: Option<Value>,
    #[serde(default)]
    pub preview_image: Option<String>,
}

impl UpdateSectionRequest {
    pub fn into_update(self) -> Result<SectionUpdate> {
        Ok(SectionUpdate {
            title: self.title,
            description: self.description,
            categories: self.categories.map(CategoriesInput::into_categories),
            price: self.price,
            content: self.content,
            style: self.style,
            script: self.script,
            schema_fragment: self.schema.map(schema_from_input).transpose()?.flatten(),
            preview: non_blank(self.preview_image)
                .map(|data| decode_data_url(&data))
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SavePreviewRequest {
    #[serde(default)]
    pub section_id: String,
    /// Data URL or bare base64 PNG
    #[serde(default)]
    pub image_data: String,
}

impl SavePreviewRequest {
    pub fn validate(&self) -> Result<()> {
        if self.section_id.trim().is_empty() || self.image_data.trim().is_empty() {
            return Err(SectionError::invalid("Section ID and image data are required"));
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Accept a fragment object or its JSON text; blank text means none.
fn schema_from_input(value: Value) -> Result<Option<Value>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) if text.trim().is_empty() => Ok(None),
        Value::String(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| SectionError::invalid(format!("Schema is not valid JSON: {}", e))),
        other => Ok(Some(other)),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ThemeIdInput {
    Number(ThemeId),
    Text(String),
}

fn theme_id_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<Option<ThemeId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<ThemeIdInput>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ThemeIdInput::Number(id)) => Ok(Some(id)),
        Some(ThemeIdInput::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid theme id '{}'", text)))
        }
    }
}
