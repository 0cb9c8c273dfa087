//! Section file resolution across library roots.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::preview::find_preview_in;
use super::{LibraryRoots, SCHEMA_FILE, SCRIPT_FILE, STYLE_FILE, TEMPLATE_FILE};
use crate::error::{Result, SectionError};
use crate::types::validate_section_id;

/// State of an optional companion file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionalFile {
    Absent,
    Present(String),
    /// The file exists but could not be read as text
    Unreadable(String),
}

impl OptionalFile {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Present(text) => Some(text),
            _ => None,
        }
    }
}

/// Files of one section, all taken from the same directory.
#[derive(Debug, Clone)]
pub struct SectionFiles {
    pub section_id: String,
    pub dir: PathBuf,
    pub template: String,
    pub style: OptionalFile,
    pub script: OptionalFile,
    pub schema: OptionalFile,
    pub preview: Option<PathBuf>,
}

/// Read-only access to section files.
#[derive(Debug, Clone)]
pub struct AssetReader {
    roots: LibraryRoots,
}

impl AssetReader {
    pub fn new(roots: LibraryRoots) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &LibraryRoots {
        &self.roots
    }

    /// Template paths probed for a section, in resolution order.
    pub fn candidate_paths(&self, section_id: &str) -> Vec<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(section_id).join(TEMPLATE_FILE))
            .collect()
    }

    /// Resolve a section by its template and load its companions.
    ///
    /// Companions are only looked up next to the resolved template. A
    /// companion that lives under a different root is never picked up.
    pub fn read(&self, section_id: &str) -> Result<SectionFiles> {
        validate_section_id(section_id)?;

        let mut attempted = Vec::new();
        for template_path in self.candidate_paths(section_id) {
            attempted.push(template_path.clone());
            if !template_path.is_file() {
                debug!(section = section_id, path = %template_path.display(), "Section not found at path");
                continue;
            }

            let template = std::fs::read_to_string(&template_path)
                .map_err(|e| SectionError::io(&template_path, e))?;
            let dir = template_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            debug!(section = section_id, dir = %dir.display(), bytes = template.len(), "Resolved section");

            return Ok(SectionFiles {
                section_id: section_id.to_string(),
                style: read_optional(&dir.join(STYLE_FILE)),
                script: read_optional(&dir.join(SCRIPT_FILE)),
                schema: read_optional(&dir.join(SCHEMA_FILE)),
                preview: find_preview_in(&dir),
                template,
                dir,
            });
        }

        Err(SectionError::SectionNotFound {
            section_id: section_id.to_string(),
            attempted,
        })
    }
}

fn read_optional(path: &Path) -> OptionalFile {
    match std::fs::read_to_string(path) {
        Ok(text) => OptionalFile::Present(text),
        Err(e) if e.kind() == ErrorKind::NotFound => OptionalFile::Absent,
        Err(e) => OptionalFile::Unreadable(format!("{}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_section(root: &Path, id: &str, files: &[(&str, &str)]) {
        let dir = root.join(id);
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    #[test]
    fn companions_are_not_searched_in_other_roots() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first");
        let second = temp.path().join("second");
        write_section(&first, "hero", &[(TEMPLATE_FILE, "{% hero %}")]);
        write_section(&second, "hero", &[(TEMPLATE_FILE, "other"), (STYLE_FILE, ".x{}")]);

        let reader = AssetReader::new(LibraryRoots::new(vec![first.clone(), second]));
        let files = reader.read("hero").unwrap();

        assert_eq!(files.dir, first.join("hero"));
        assert_eq!(files.template, "{% hero %}");
        assert_eq!(files.style, OptionalFile::Absent);
    }

    #[test]
    fn non_utf8_companion_is_unreadable() {
        let temp = TempDir::new().unwrap();
        write_section(temp.path(), "hero", &[(TEMPLATE_FILE, "t")]);
        fs::write(temp.path().join("hero").join(SCRIPT_FILE), [0xff, 0xfe, 0x00]).unwrap();

        let reader = AssetReader::new(LibraryRoots::new(vec![temp.path().to_path_buf()]));
        let files = reader.read("hero").unwrap();

        assert!(matches!(files.script, OptionalFile::Unreadable(_)));
    }

    #[test]
    fn invalid_id_is_rejected_before_probing() {
        let temp = TempDir::new().unwrap();
        let reader = AssetReader::new(LibraryRoots::new(vec![temp.path().to_path_buf()]));
        assert!(matches!(
            reader.read("../secrets"),
            Err(SectionError::InvalidRequest(_))
        ));
    }
}
