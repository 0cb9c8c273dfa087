//! Sectionkit Core Library
//!
//! Maintains a filesystem library of storefront sections and deploys them
//! into remote store themes through the Admin REST API.

pub mod auth;
pub mod commands;
pub mod config;
pub mod context;
pub mod deploy;
pub mod error;
pub mod library;
pub mod schema;
pub mod theme;
pub mod types;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigScope, ConfigStore, ResolvedConfig, SectionkitConfig};
    pub use crate::context::AppContext;

    // Library
    pub use crate::library::{
        AssetReader, LibraryRepository, LibraryRoots, PreviewImage, PreviewRef, PreviewResolver,
        SectionMetadata, SectionSummary, StoredSection,
    };

    // Deployment
    pub use crate::deploy::{
        AssetKind, AssetOutcome, InstallRequest, InstallationResult, SectionInstaller, SkipReason,
    };

    // Theme API
    pub use crate::auth::{AccessToken, CredentialStore, InMemoryCredentialStore};
    pub use crate::theme::{Theme, ThemeApi, ThemeApiError, ThemeRole};

    // Operations
    pub use crate::commands::{
        InstallSectionRequest, SavePreviewRequest, SectionService, UpdateSectionRequest,
        UploadSectionRequest,
    };
    pub use crate::error::{Result, SectionError};
}
