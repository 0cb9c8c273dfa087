//! Optional deployment steps.
//!
//! Each step owns one asset and always yields an [`AssetReport`]; none of them
//! can abort an install.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::locks::SchemaWriteLocks;
use super::report::{AssetKind, AssetOutcome, AssetReport, SkipReason};
use crate::library::OptionalFile;
use crate::library::reader::SectionFiles;
use crate::library::validate_schema_fragment;
use crate::schema::{SchemaMerge, SchemaMergeError, merge_fragment};
use crate::theme::{SETTINGS_SCHEMA_KEY, ThemeApi};
use crate::types::ThemeId;

/// Target of a running install.
pub(crate) struct StepTarget<'a> {
    pub api: &'a dyn ThemeApi,
    pub shop: &'a str,
    pub theme_id: ThemeId,
    pub section_id: &'a str,
    pub locks: &'a SchemaWriteLocks,
}

pub(crate) enum OptionalStep<'a> {
    /// Copy a companion file to its theme asset verbatim
    Companion {
        kind: AssetKind,
        file: &'a OptionalFile,
    },
    /// Register the section's schema fragment
    Schema { file: &'a OptionalFile },
}

/// Steps run after the template, in order.
pub(crate) fn optional_steps(files: &SectionFiles) -> Vec<OptionalStep<'_>> {
    vec![
        OptionalStep::Companion {
            kind: AssetKind::Style,
            file: &files.style,
        },
        OptionalStep::Companion {
            kind: AssetKind::Script,
            file: &files.script,
        },
        OptionalStep::Schema {
            file: &files.schema,
        },
    ]
}

impl OptionalStep<'_> {
    pub fn kind(&self) -> AssetKind {
        match self {
            Self::Companion { kind, .. } => *kind,
            Self::Schema { .. } => AssetKind::Schema,
        }
    }

    pub fn run(&self, target: &StepTarget<'_>) -> AssetReport {
        let kind = self.kind();
        let outcome = match self {
            Self::Companion { kind, file } => run_companion(*kind, file, target),
            Self::Schema { file } => run_schema(file, target),
        };

        match &outcome {
            AssetOutcome::Installed => {
                info!(section = target.section_id, asset = kind.label(), "Installed asset")
            }
            AssetOutcome::Skipped { reason, .. } => {
                debug!(section = target.section_id, asset = kind.label(), ?reason, "Skipped asset")
            }
            AssetOutcome::Failed { reason } => {
                warn!(section = target.section_id, asset = kind.label(), %reason, "Asset failed")
            }
        }

        AssetReport::new(kind, target.section_id, outcome)
    }
}

fn run_companion(kind: AssetKind, file: &OptionalFile, target: &StepTarget<'_>) -> AssetOutcome {
    let text = match file {
        OptionalFile::Absent => return AssetOutcome::skipped(SkipReason::Absent),
        OptionalFile::Unreadable(reason) => return AssetOutcome::failed(reason.clone()),
        OptionalFile::Present(text) => text,
    };

    let key = kind.asset_key(target.section_id);
    match target.api.put_asset(target.shop, target.theme_id, &key, text) {
        Ok(()) => AssetOutcome::Installed,
        Err(e) => AssetOutcome::failed(e.to_string()),
    }
}

fn run_schema(file: &OptionalFile, target: &StepTarget<'_>) -> AssetOutcome {
    let text = match file {
        OptionalFile::Absent => return AssetOutcome::skipped(SkipReason::Absent),
        OptionalFile::Unreadable(reason) => return AssetOutcome::failed(reason.clone()),
        OptionalFile::Present(text) => text,
    };

    let fragment: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => return AssetOutcome::failed(format!("schema.json is not valid JSON: {}", e)),
    };
    if let Err(reason) = validate_schema_fragment(&fragment) {
        return AssetOutcome::failed(format!("Invalid schema fragment: {}", reason));
    }

    let lock = target.locks.lock_for(target.shop, target.theme_id);
    let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    let aggregate = match target
        .api
        .get_asset(target.shop, target.theme_id, SETTINGS_SCHEMA_KEY)
    {
        Ok(aggregate) => aggregate,
        Err(e) => return AssetOutcome::failed(format!("Failed to fetch settings schema: {}", e)),
    };

    match merge_fragment(aggregate.as_deref(), &fragment) {
        Ok(SchemaMerge::Unchanged) => AssetOutcome::skipped(SkipReason::AlreadyRegistered),
        Ok(SchemaMerge::Appended(merged)) => {
            match target
                .api
                .put_asset(target.shop, target.theme_id, SETTINGS_SCHEMA_KEY, &merged)
            {
                Ok(()) => AssetOutcome::Installed,
                Err(e) => AssetOutcome::failed(e.to_string()),
            }
        }
        Err(SchemaMergeError::AggregateUnavailable(detail)) => AssetOutcome::Skipped {
            reason: SkipReason::AggregateUnavailable,
            detail: Some(detail),
        },
        Err(e @ SchemaMergeError::InvalidFragment(_)) => AssetOutcome::failed(e.to_string()),
    }
}
