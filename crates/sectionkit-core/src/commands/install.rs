use tracing::info;

use super::SectionService;
use super::requests::InstallSectionRequest;
use crate::deploy::InstallationResult;
use crate::error::{Result, SectionError};
use crate::theme::Theme;

impl SectionService {
    /// Deploy a library section into a store theme.
    pub fn install_section(&self, request: InstallSectionRequest) -> Result<InstallationResult> {
        let request = request.into_install_request()?;
        info!(shop = %request.shop, section = %request.section_id, theme = ?request.theme_id, "Install requested");
        self.installer.install(&request)
    }

    pub fn list_themes(&self, shop: &str) -> Result<Vec<Theme>> {
        let shop = shop.trim();
        if shop.is_empty() {
            return Err(SectionError::invalid("Shop is required"));
        }
        self.themes.list_themes(shop)
    }
}
