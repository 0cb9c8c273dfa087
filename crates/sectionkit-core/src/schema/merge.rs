//! Settings schema merging.
//!
//! The theme keeps one aggregate `config/settings_schema.json` array. Sections
//! register themselves by appending their fragment, keyed by `name`:
//! - name absent: the fragment is appended
//! - name present: the aggregate is left untouched (first write wins)
//!
//! A changed fragment is therefore not propagated by a reinstall; the stale
//! entry must be removed from the theme first.

use serde_json::Value;
use thiserror::Error;

use crate::library::validate_schema_fragment;

/// Outcome of merging a fragment into the aggregate schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaMerge {
    /// An entry with the fragment's name already exists
    Unchanged,
    /// The fragment was appended; holds the serialized aggregate
    Appended(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaMergeError {
    /// Aggregate missing or not a JSON array
    #[error("Settings schema unavailable: {0}")]
    AggregateUnavailable(String),

    #[error("Invalid schema fragment: {0}")]
    InvalidFragment(String),
}

/// Merge a section fragment into the theme's aggregate schema text.
pub fn merge_fragment(
    aggregate: Option<&str>,
    fragment: &Value,
) -> Result<SchemaMerge, SchemaMergeError> {
    let aggregate = aggregate.ok_or_else(|| {
        SchemaMergeError::AggregateUnavailable("theme has no settings schema".to_string())
    })?;
    let mut entries = parse_aggregate(aggregate)?;

    if !append_if_absent(&mut entries, fragment)? {
        return Ok(SchemaMerge::Unchanged);
    }

    let serialized = serde_json::to_string_pretty(&entries)
        .map_err(|e| SchemaMergeError::AggregateUnavailable(e.to_string()))?;
    Ok(SchemaMerge::Appended(serialized))
}

/// Append `fragment` unless an entry with the same `name` exists.
///
/// Returns whether the entries changed.
pub fn append_if_absent(
    entries: &mut Vec<Value>,
    fragment: &Value,
) -> Result<bool, SchemaMergeError> {
    let name = validate_schema_fragment(fragment).map_err(SchemaMergeError::InvalidFragment)?;
    if entries.iter().any(|entry| entry_name(entry) == Some(name)) {
        return Ok(false);
    }
    entries.push(fragment.clone());
    Ok(true)
}

/// Parse the aggregate schema into its entries.
pub fn parse_aggregate(aggregate: &str) -> Result<Vec<Value>, SchemaMergeError> {
    match serde_json::from_str::<Value>(aggregate) {
        Ok(Value::Array(entries)) => Ok(entries),
        Ok(_) => Err(SchemaMergeError::AggregateUnavailable(
            "settings schema is not a JSON array".to_string(),
        )),
        Err(e) => Err(SchemaMergeError::AggregateUnavailable(format!(
            "settings schema is not valid JSON: {}",
            e
        ))),
    }
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry.get("name").and_then(Value::as_str)
}

/// Number of aggregate entries carrying `name`.
pub fn count_named(entries: &[Value], name: &str) -> usize {
    entries
        .iter()
        .filter(|entry| entry_name(entry) == Some(name))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const THEME_INFO: &str = r#"[{"name": "theme_info", "theme_name": "Dawn"}]"#;

    #[test]
    fn appends_new_fragment() {
        let fragment = json!({"name": "FAQ", "settings": []});
        let merged = merge_fragment(Some(THEME_INFO), &fragment).unwrap();

        let SchemaMerge::Appended(text) = merged else {
            panic!("expected append");
        };
        let entries = parse_aggregate(&text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], fragment);
    }

    #[test]
    fn existing_name_wins() {
        let aggregate = r#"[{"name": "FAQ", "settings": [{"id": "old"}]}]"#;
        let fragment = json!({"name": "FAQ", "settings": [{"id": "new"}]});

        assert_eq!(
            merge_fragment(Some(aggregate), &fragment).unwrap(),
            SchemaMerge::Unchanged
        );
    }

    #[test]
    fn repeated_merges_never_duplicate() {
        let fragment = json!({"name": "FAQ"});
        let mut entries = parse_aggregate(THEME_INFO).unwrap();
        for _ in 0..5 {
            append_if_absent(&mut entries, &fragment).unwrap();
        }
        assert_eq!(count_named(&entries, "FAQ"), 1);
    }

    #[test]
    fn missing_or_broken_aggregate_is_unavailable() {
        let fragment = json!({"name": "FAQ"});
        for aggregate in [None, Some("{not json"), Some(r#"{"name": "x"}"#)] {
            assert!(matches!(
                merge_fragment(aggregate, &fragment),
                Err(SchemaMergeError::AggregateUnavailable(_))
            ));
        }
    }

    #[test]
    fn nameless_fragment_is_invalid() {
        assert!(matches!(
            merge_fragment(Some("[]"), &json!({"settings": []})),
            Err(SchemaMergeError::InvalidFragment(_))
        ));
    }
}
