//! Operations exposed to frontends.
//!
//! [`SectionService`] is the single entry point the CLI (or any admin
//! surface) talks to. It validates request payloads and delegates to the
//! library repository, preview resolver and installer.

mod install;
mod library;
mod preview;
pub mod requests;

use std::sync::Arc;

use crate::deploy::SectionInstaller;
use crate::library::LibraryRepository;
use crate::theme::ThemeResolver;

pub use requests::{
    CategoriesInput, InstallSectionRequest, SavePreviewRequest, UpdateSectionRequest,
    UploadSectionRequest, parse_request,
};

#[derive(Debug, Clone)]
pub struct SectionService {
    repository: Arc<LibraryRepository>,
    installer: Arc<SectionInstaller>,
    themes: ThemeResolver,
}

impl SectionService {
    pub fn new(
        repository: Arc<LibraryRepository>,
        installer: Arc<SectionInstaller>,
        themes: ThemeResolver,
    ) -> Self {
        Self {
            repository,
            installer,
            themes,
        }
    }

    pub fn repository(&self) -> &LibraryRepository {
        &self.repository
    }

    pub fn installer(&self) -> &SectionInstaller {
        &self.installer
    }
}
