//! Error taxonomy for library and deployment operations.
//!
//! Fatal conditions surface as [`SectionError`]. Per-asset problems during an
//! install are never errors; they are recorded in the
//! [`InstallationResult`](crate::deploy::InstallationResult).

use std::path::PathBuf;

use thiserror::Error;

use crate::theme::ThemeApiError;

/// Main error type for section library and deployment operations
#[derive(Error, Debug)]
pub enum SectionError {
    /// Missing or malformed input supplied by the caller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No library root contains the section's template
    #[error("Section '{section_id}' not found (tried: {})", display_paths(.attempted))]
    SectionNotFound {
        section_id: String,
        attempted: Vec<PathBuf>,
    },

    /// A section with the same id already exists in the library
    #[error("Section '{0}' already exists")]
    AlreadyExists(String),

    /// Theme discovery found no theme with the main role
    #[error("No active theme found for shop '{shop}'")]
    NoActiveTheme { shop: String },

    /// The required template asset could not be written
    #[error("Failed to deploy required asset '{key}': {source}")]
    DeployFailed {
        key: String,
        #[source]
        source: ThemeApiError,
    },

    /// Remote theme API failure outside of asset writes
    #[error(transparent)]
    ThemeApi(#[from] ThemeApiError),

    /// Local filesystem failure
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Section metadata could not be serialized or deserialized
    #[error("Invalid metadata at {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for section operations
pub type Result<T> = std::result::Result<T, SectionError>;

impl SectionError {
    /// Create an invalid request error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create an IO error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// HTTP-equivalent status code for the admin surface
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::SectionNotFound { .. } => 404,
            Self::AlreadyExists(_) => 409,
            Self::NoActiveTheme { .. } => 404,
            Self::DeployFailed { .. } | Self::ThemeApi(_) | Self::Io { .. } | Self::Metadata { .. } => {
                500
            }
        }
    }

    /// Whether the caller is at fault (4xx-equivalent)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_lists_attempted_paths() {
        let err = SectionError::SectionNotFound {
            section_id: "foo".to_string(),
            attempted: vec![
                PathBuf::from("/a/foo/section.liquid"),
                PathBuf::from("/b/foo/section.liquid"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/foo/section.liquid, /b/foo/section.liquid"));
        assert_eq!(err.status_code(), 404);
        assert!(err.is_client_error());
    }

    #[test]
    fn deploy_failure_is_server_error() {
        let err = SectionError::DeployFailed {
            key: "sections/foo.liquid".to_string(),
            source: ThemeApiError::Transport("connection reset".to_string()),
        };
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_client_error());
        assert!(err.to_string().contains("sections/foo.liquid"));
    }
}
