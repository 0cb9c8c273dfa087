//! Target theme selection.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{Theme, ThemeApi, ThemeRole};
use crate::error::{Result, SectionError};
use crate::types::ThemeId;

/// Lists themes and picks the install target.
#[derive(Clone)]
pub struct ThemeResolver {
    api: Arc<dyn ThemeApi>,
}

impl std::fmt::Debug for ThemeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeResolver").finish_non_exhaustive()
    }
}

impl ThemeResolver {
    pub fn new(api: Arc<dyn ThemeApi>) -> Self {
        Self { api }
    }

    pub fn list_themes(&self, shop: &str) -> Result<Vec<Theme>> {
        Ok(self.api.list_themes(shop)?)
    }

    /// Resolve the theme a section is deployed into.
    ///
    /// An explicit id is trusted without validation; an invalid id surfaces
    /// later when the first asset write fails. The listing is still used to
    /// look up a display name, but any failure there is ignored.
    pub fn resolve_target(&self, shop: &str, explicit_id: Option<ThemeId>) -> Result<Theme> {
        match explicit_id {
            Some(id) => Ok(self.describe_explicit(shop, id)),
            None => {
                let themes = self.api.list_themes(shop)?;
                let theme = select_main(&themes).cloned().ok_or_else(|| {
                    SectionError::NoActiveTheme {
                        shop: shop.to_string(),
                    }
                })?;
                debug!(shop, theme = theme.id, name = %theme.name, "Selected main theme");
                Ok(theme)
            }
        }
    }

    fn describe_explicit(&self, shop: &str, id: ThemeId) -> Theme {
        match self.api.list_themes(shop) {
            Ok(themes) => themes
                .into_iter()
                .find(|theme| theme.id == id)
                .unwrap_or_else(|| unlisted_theme(id)),
            Err(err) => {
                warn!(shop, theme = id, error = %err, "Theme lookup failed, continuing with explicit id");
                unlisted_theme(id)
            }
        }
    }
}

/// First theme carrying the main role, if any.
pub fn select_main(themes: &[Theme]) -> Option<&Theme> {
    themes.iter().find(|theme| theme.is_main())
}

fn unlisted_theme(id: ThemeId) -> Theme {
    Theme {
        id,
        name: String::new(),
        role: ThemeRole::Other,
    }
}
