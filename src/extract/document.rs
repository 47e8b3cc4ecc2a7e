//! Markdown file -> [`Document`]

use super::{content_hash, frontmatter, slugify, validate_links, Document};
use crate::error::Result;
use crate::mapping::{SpecialtyMapping, TechnologyMapping};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Fallback id when a file name has no slug-able characters
const DEFAULT_ID: &str = "default";

/// Extracts documents from Markdown files below a docs root
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    root: PathBuf,
}

impl DocumentExtractor {
    /// Create an extractor for files under `root`
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Extract one file.
    ///
    /// Returns `None` for drafts, unmapped technologies and unmapped
    /// specialties. Read and parse failures are logged and also yield `None`.
    pub fn extract(
        &self,
        path: &Path,
        technologies: &TechnologyMapping,
        specialties: Option<&SpecialtyMapping>,
    ) -> Option<Document> {
        match self.try_extract(path, technologies, specialties) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to process file {:?}: {}", path, e);
                None
            }
        }
    }

    fn try_extract(
        &self,
        path: &Path,
        technologies: &TechnologyMapping,
        specialties: Option<&SpecialtyMapping>,
    ) -> Result<Option<Document>> {
        let bytes = std::fs::read(path)?;
        let hash = content_hash(&bytes);
        let raw = String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let (matter, body) = frontmatter::parse(&raw)?;

        if matter.draft {
            info!("Skipping {:?}: draft", path);
            return Ok(None);
        }

        let Some(technology) = self.technology_key(path) else {
            debug!("Skipping {:?}: not inside a technology folder", path);
            return Ok(None);
        };

        let Some(entry) = technologies.get(&technology) else {
            debug!("Skipping {:?}: technology {:?} is not mapped", path, technology);
            return Ok(None);
        };

        let Some(specialty) = entry.primary_specialty() else {
            info!("Skipping {:?}: technology {:?} has no specialty", path, technology);
            return Ok(None);
        };

        if let Some(specialties) = specialties {
            if !specialties.contains_key(&specialty) {
                info!(
                    "Skipping {:?}: specialty {:?} is not declared in the specialty mapping",
                    path, specialty
                );
                return Ok(None);
            }
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Some(Document {
            id: slugify(&stem, DEFAULT_ID),
            title: matter.title.unwrap_or_else(|| stem.clone()),
            content: body.to_string(),
            description: entry.description().to_string(),
            technology,
            specialty,
            priority: entry.priority(),
            tags: matter.tags,
            links: validate_links(&matter.info),
            content_hash: hash,
            source_path: path.to_path_buf(),
        }))
    }

    /// Technology key of a file: its top-level folder under the root, with
    /// any numeric ordering prefix removed (`"001 Frontend"` -> `"Frontend"`)
    pub fn technology_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut components = relative.components().filter_map(|c| match c {
            Component::Normal(name) => Some(name),
            _ => None,
        });

        let folder = components.next()?;
        // a file directly under the root has no technology folder
        components.next()?;

        Some(strip_order_prefix(&folder.to_string_lossy()).to_string())
    }
}

/// Remove a leading `<digits><whitespace>` ordering prefix
pub fn strip_order_prefix(name: &str) -> &str {
    let after_digits = name.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == name.len() {
        return name;
    }

    let after_space = after_digits.trim_start();
    if after_space.len() == after_digits.len() {
        name
    } else {
        after_space
    }
}
