use std::path::PathBuf;

use super::SectionService;
use super::requests::SavePreviewRequest;
use crate::error::Result;
use crate::library::PreviewImage;
use crate::library::preview::decode_data_url;

impl SectionService {
    /// Preview bytes for a section; the generated placeholder when none exists.
    pub fn get_preview(&self, section_id: &str) -> Result<PreviewImage> {
        self.repository.previews().load(section_id.trim())
    }

    pub fn save_preview(&self, request: SavePreviewRequest) -> Result<PathBuf> {
        request.validate()?;
        let upload = decode_data_url(request.image_data.trim())?;
        self.repository
            .save_preview(request.section_id.trim(), &upload)
    }

    pub fn generate_placeholder(&self, section_id: &str) -> Result<bool> {
        self.repository
            .previews()
            .generate_placeholder(section_id.trim())
    }
}
