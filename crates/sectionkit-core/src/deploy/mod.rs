//! Deployment of library sections into store themes.

pub mod installer;
pub mod locks;
pub mod report;
mod steps;

pub use installer::{InstallRequest, SectionInstaller};
pub use locks::SchemaWriteLocks;
pub use report::{AssetKind, AssetOutcome, AssetReport, InstallationResult, SkipReason};
