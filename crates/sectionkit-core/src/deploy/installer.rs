//! Section deployment into a store theme.

use std::sync::Arc;

use tracing::{error, info, info_span};

use super::locks::SchemaWriteLocks;
use super::report::{AssetKind, AssetOutcome, AssetReport, InstallationResult};
use super::steps::{StepTarget, optional_steps};
use crate::error::{Result, SectionError};
use crate::library::AssetReader;
use crate::theme::{ThemeApi, ThemeResolver};
use crate::types::{ThemeId, validate_section_id};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub shop: String,
    pub section_id: String,
    /// Explicit target; the shop's main theme when `None`
    pub theme_id: Option<ThemeId>,
}

impl InstallRequest {
    pub fn new(shop: impl Into<String>, section_id: impl Into<String>) -> Self {
        Self {
            shop: shop.into(),
            section_id: section_id.into(),
            theme_id: None,
        }
    }

    pub fn with_theme(mut self, theme_id: ThemeId) -> Self {
        self.theme_id = Some(theme_id);
        self
    }
}

/// Deploys library sections into themes.
///
/// Only the template write is fatal. Style, script and schema each produce
/// an [`AssetOutcome`] in the result and never abort the install.
pub struct SectionInstaller {
    api: Arc<dyn ThemeApi>,
    themes: ThemeResolver,
    reader: AssetReader,
    schema_locks: Arc<SchemaWriteLocks>,
}

impl std::fmt::Debug for SectionInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionInstaller")
            .field("reader", &self.reader)
            .finish_non_exhaustive()
    }
}

impl SectionInstaller {
    pub fn new(
        api: Arc<dyn ThemeApi>,
        reader: AssetReader,
        schema_locks: Arc<SchemaWriteLocks>,
    ) -> Self {
        Self {
            themes: ThemeResolver::new(api.clone()),
            api,
            reader,
            schema_locks,
        }
    }

    pub fn reader(&self) -> &AssetReader {
        &self.reader
    }

    pub fn install(&self, request: &InstallRequest) -> Result<InstallationResult> {
        let shop = request.shop.trim();
        if shop.is_empty() {
            return Err(SectionError::invalid("Shop is required"));
        }
        validate_section_id(&request.section_id)?;
        let section_id = request.section_id.as_str();

        let span = info_span!("install", shop, section = section_id);
        let _enter = span.enter();

        let theme = self.themes.resolve_target(shop, request.theme_id)?;
        let files = self.reader.read(section_id)?;
        info!(theme = theme.id, dir = %files.dir.display(), "Installing section");

        let template_key = AssetKind::Template.asset_key(section_id);
        if let Err(source) = self
            .api
            .put_asset(shop, theme.id, &template_key, &files.template)
        {
            error!(theme = theme.id, key = %template_key, error = %source, "Template write failed");
            return Err(SectionError::DeployFailed {
                key: template_key,
                source,
            });
        }

        let mut assets = vec![AssetReport::new(
            AssetKind::Template,
            section_id,
            AssetOutcome::Installed,
        )];

        let target = StepTarget {
            api: self.api.as_ref(),
            shop,
            theme_id: theme.id,
            section_id,
            locks: &self.schema_locks,
        };
        assets.extend(optional_steps(&files).iter().map(|step| step.run(&target)));

        let theme_name = Some(theme.name).filter(|name| !name.is_empty());
        let result = InstallationResult::new(section_id, theme.id, theme_name, assets);
        info!(
            theme = result.theme_id,
            failed = result.failures().count(),
            "Section installed"
        );
        Ok(result)
    }
}
