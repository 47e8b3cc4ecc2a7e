//! Recursive scan of a Markdown tree
//!
//! The scanner walks the docs root depth-first, hands every `.md` file to the
//! [`DocumentExtractor`] and collects the documents it produces. Per-file
//! problems are absorbed by the extractor; only a missing or unreadable tree
//! aborts the scan.

use crate::config::ScanConfig;
use crate::error::{Result, SyncError};
use crate::extract::{Document, DocumentExtractor};
use crate::mapping::{self, SpecialtyMapping, TechnologyMapping};
use std::path::Path;
use tracing::{debug, info};

/// Markdown file extension
const MARKDOWN_EXTENSION: &str = ".md";

/// Scans a docs tree with a fixed pair of mappings
#[derive(Debug, Clone, Default)]
pub struct TreeScanner {
    technologies: TechnologyMapping,
    specialties: Option<SpecialtyMapping>,
}

impl TreeScanner {
    /// Create a scanner.
    ///
    /// An empty specialty mapping is treated as absent, so it does not filter
    /// out every document.
    pub fn new(technologies: TechnologyMapping, specialties: SpecialtyMapping) -> Self {
        Self {
            technologies,
            specialties: (!specialties.is_empty()).then_some(specialties),
        }
    }

    /// Create a scanner from the mapping files named in `config`
    pub fn from_config(config: &ScanConfig) -> Self {
        let technologies = mapping::load_technology_mapping(&config.technology_path);
        let specialties = config
            .specialties_path
            .as_deref()
            .map(mapping::load_specialty_mapping)
            .unwrap_or_default();

        Self::new(technologies, specialties)
    }

    pub fn technologies(&self) -> &TechnologyMapping {
        &self.technologies
    }

    /// The specialty mapping, or an empty one when none was supplied
    pub fn specialties(&self) -> SpecialtyMapping {
        self.specialties.clone().unwrap_or_default()
    }

    /// Scan every Markdown file under `root`
    pub fn scan(&self, root: &Path) -> Result<Vec<Document>> {
        if !root.is_dir() {
            return Err(SyncError::DirectoryNotFound(root.to_path_buf()));
        }

        let extractor = DocumentExtractor::new(root);
        let mut documents = Vec::new();

        for entry in walkdir::WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }

            debug!("Processing {:?}", entry.path());
            if let Some(document) =
                extractor.extract(entry.path(), &self.technologies, self.specialties.as_ref())
            {
                documents.push(document);
            }
        }

        info!("Scanned {:?}: {} documents", root, documents.len());
        Ok(documents)
    }
}

fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(MARKDOWN_EXTENSION))
        .unwrap_or(false)
}

/// Load the mappings named in `config` and scan its docs root
pub fn scan_documents(config: &ScanConfig) -> Result<Vec<Document>> {
    TreeScanner::from_config(config).scan(&config.docs_path)
}
