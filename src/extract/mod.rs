//! Document extraction from Markdown files
//!
//! This module turns one Markdown file into a normalized [`Document`]:
//! - Splits the `---` delimited front-matter from the body
//! - Resolves the technology and specialty through the YAML mappings
//! - Validates the external links listed in the front-matter
//! - Fingerprints the raw file bytes for change detection

mod document;
pub mod frontmatter;
pub mod links;

pub use document::DocumentExtractor;
pub use frontmatter::FrontMatter;
pub use links::validate_links;

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Compute a stable hash for raw file content
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Slug used as a document identifier.
///
/// Lowercases the text and collapses every run of characters outside
/// `[a-z0-9]` into a single `-`. Returns `fallback` when nothing is left.
pub fn slugify(text: &str, fallback: &str) -> String {
    let lowered = text.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;

    for c in lowered.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

/// Slug for specialty and technology names: lowercase, whitespace runs become `-`
pub fn name_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(c);
            in_whitespace = false;
        }
    }

    slug
}

/// Slug of the article row stored for a document under one specialty
pub fn article_slug(document_id: &str, specialty: &str) -> String {
    format!("{}-{}", document_id, name_slug(specialty))
}

/// A document produced from one Markdown file during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Slug of the file name without extension
    pub id: String,
    /// Front-matter title, or the file name
    pub title: String,
    /// Body text without the front-matter block
    pub content: String,
    /// Description taken from the technology mapping
    pub description: String,
    /// Technology key (folder name without its ordering prefix)
    pub technology: String,
    /// Primary specialty resolved from the technology mapping
    pub specialty: String,
    /// Sort weight, lower is more important
    pub priority: i64,
    /// Free-text labels from the front-matter
    pub tags: Vec<String>,
    /// Validated absolute http(s) links from the front-matter `info` list
    pub links: Vec<String>,
    /// SHA-256 of the raw file bytes, front-matter included
    pub content_hash: String,
    /// Where the document was read from
    pub source_path: PathBuf,
}
