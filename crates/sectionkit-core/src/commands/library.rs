use super::SectionService;
use super::requests::{UpdateSectionRequest, UploadSectionRequest};
use crate::error::Result;
use crate::library::{SectionMetadata, SectionSummary, StoredSection};

impl SectionService {
    pub fn list_sections(&self) -> Result<Vec<SectionSummary>> {
        self.repository.list()
    }

    pub fn get_section(&self, section_id: &str) -> Result<StoredSection> {
        self.repository.get(section_id.trim())
    }

    /// Add a section to the library; returns the normalized id.
    pub fn upload_section(&self, request: UploadSectionRequest) -> Result<String> {
        let definition = request.into_definition()?;
        self.repository.create(definition)
    }

    pub fn update_section(
        &self,
        section_id: &str,
        request: UpdateSectionRequest,
    ) -> Result<SectionMetadata> {
        let update = request.into_update()?;
        self.repository.update(section_id.trim(), update)
    }

    /// Remove a section everywhere; `false` when nothing existed.
    pub fn delete_section(&self, section_id: &str) -> Result<bool> {
        self.repository.delete(section_id.trim())
    }
}
