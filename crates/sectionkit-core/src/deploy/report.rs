//! Per-asset outcomes and the aggregated installation result.

use serde::Serialize;

use crate::theme::SETTINGS_SCHEMA_KEY;
use crate::types::ThemeId;

/// Asset deployed for a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Template,
    Style,
    Script,
    Schema,
}

impl AssetKind {
    /// Theme asset key written for this kind.
    pub fn asset_key(self, section_id: &str) -> String {
        match self {
            Self::Template => format!("sections/{}.liquid", section_id),
            Self::Style => format!("assets/{}.css", section_id),
            Self::Script => format!("assets/{}.js", section_id),
            Self::Schema => SETTINGS_SCHEMA_KEY.to_string(),
        }
    }

    /// Only the template makes a section count as installed.
    pub fn is_required(self) -> bool {
        self == Self::Template
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Style => "style",
            Self::Script => "script",
            Self::Schema => "schema",
        }
    }
}

/// Why an asset was not written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The section has no such file
    Absent,
    /// The aggregate schema already holds an entry with this name
    AlreadyRegistered,
    /// The theme's aggregate schema is missing or unparseable
    AggregateUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssetOutcome {
    Installed,
    Skipped {
        reason: SkipReason,
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Failed {
        reason: String,
    },
}

impl AssetOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        Self::Skipped {
            reason,
            detail: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_installed(&self) -> bool {
        matches!(self, Self::Installed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetReport {
    pub kind: AssetKind,
    pub key: String,
    #[serde(flatten)]
    pub outcome: AssetOutcome,
}

impl AssetReport {
    pub fn new(kind: AssetKind, section_id: &str, outcome: AssetOutcome) -> Self {
        Self {
            kind,
            key: kind.asset_key(section_id),
            outcome,
        }
    }
}

/// Result of deploying one section into one theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationResult {
    pub section_id: String,
    pub theme_id: ThemeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_name: Option<String>,
    pub assets: Vec<AssetReport>,
    /// True iff the required template asset was installed
    pub success: bool,
}

impl InstallationResult {
    pub fn new(
        section_id: impl Into<String>,
        theme_id: ThemeId,
        theme_name: Option<String>,
        assets: Vec<AssetReport>,
    ) -> Self {
        let success = assets
            .iter()
            .any(|asset| asset.kind.is_required() && asset.outcome.is_installed());
        Self {
            section_id: section_id.into(),
            theme_id,
            theme_name,
            assets,
            success,
        }
    }

    pub fn outcome(&self, kind: AssetKind) -> Option<&AssetOutcome> {
        self.assets
            .iter()
            .find(|asset| asset.kind == kind)
            .map(|asset| &asset.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssetReport> {
        self.assets.iter().filter(|asset| asset.outcome.is_failed())
    }

    /// Installed with no failed companion.
    pub fn is_complete(&self) -> bool {
        self.success && self.failures().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_keys_are_namespaced() {
        assert_eq!(AssetKind::Template.asset_key("faq-1"), "sections/faq-1.liquid");
        assert_eq!(AssetKind::Style.asset_key("faq-1"), "assets/faq-1.css");
        assert_eq!(AssetKind::Script.asset_key("faq-1"), "assets/faq-1.js");
        assert_eq!(AssetKind::Schema.asset_key("faq-1"), "config/settings_schema.json");
    }

    #[test]
    fn success_tracks_template_only() {
        let result = InstallationResult::new(
            "faq-1",
            42,
            None,
            vec![
                AssetReport::new(AssetKind::Template, "faq-1", AssetOutcome::Installed),
                AssetReport::new(AssetKind::Style, "faq-1", AssetOutcome::failed("HTTP 500")),
            ],
        );
        assert!(result.success);
        assert!(!result.is_complete());
        assert_eq!(result.failures().count(), 1);
    }

    #[test]
    fn serializes_outcomes_with_status_tag() {
        let report = AssetReport::new(
            AssetKind::Schema,
            "faq-1",
            AssetOutcome::skipped(SkipReason::AlreadyRegistered),
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "kind": "schema",
                "key": "config/settings_schema.json",
                "status": "skipped",
                "reason": "already_registered"
            })
        );
    }
}
