//! SQLite storage layer for docsync
//!
//! This module handles persistent storage of:
//! - Specialties and technologies, and the links between them
//! - Articles (one per document and specialty) with their content hash
//! - Tags and external links attached to articles

mod ids;
mod schema;
mod writer;

pub use ids::IdTable;
pub use schema::{CLEAR_ORDER, SCHEMA};
pub use writer::{write_documents, SaveReport};

use crate::extract::Document;
use crate::mapping::{SpecialtyMapping, TechnologyMapping};
use crate::sync::HashSource;
use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {:?}", path))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an existing database for reading.
    ///
    /// Creates neither the file nor its schema; a missing file is an error.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open database at {:?} for reading", path))?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.conn
            .execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    // ==================== Documents ====================

    /// Persist documents and mappings in one transaction.
    ///
    /// Any failure rolls the whole batch back.
    pub fn save_documents(
        &mut self,
        documents: &[Document],
        technologies: &TechnologyMapping,
        specialties: &SpecialtyMapping,
    ) -> Result<SaveReport> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;

        match write_documents(&tx, documents, technologies, specialties) {
            Ok(report) => {
                tx.commit().context("Failed to commit documents")?;
                info!(
                    "Saved {} articles ({} skipped) for {} documents",
                    report.articles,
                    report.skipped,
                    documents.len()
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("Failed to roll back transaction: {}", rollback_err);
                }
                Err(e.context("Failed to save documents, transaction rolled back"))
            }
        }
    }

    /// Stored content hash per article slug
    pub fn file_hashes(&self) -> Result<BTreeMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT slug, file_hash FROM articles WHERE file_hash IS NOT NULL")?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut hashes = BTreeMap::new();
        for row in rows {
            let (slug, hash): (String, String) = row?;
            hashes.insert(slug, hash);
        }

        debug!("Loaded {} stored hashes", hashes.len());
        Ok(hashes)
    }

    /// Every article with its specialty and technology names, by slug
    pub fn article_summaries(&self) -> Result<Vec<ArticleSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT a.slug, a.title, s.name, t.name, a.priority, a.file_hash
            FROM articles a
            JOIN specialties s ON s.id = a.specialty_id
            JOIN technologies t ON t.id = a.technology_id
            ORDER BY a.slug
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ArticleSummary {
                slug: row.get(0)?,
                title: row.get(1)?,
                specialty: row.get(2)?,
                technology: row.get(3)?,
                priority: row.get(4)?,
                file_hash: row.get(5)?,
            })
        })?;

        let mut articles = Vec::new();
        for row in rows {
            articles.push(row?);
        }

        Ok(articles)
    }

    /// Tag names attached to an article, sorted
    pub fn article_tags(&self, slug: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT t.name FROM tags t
            JOIN article_tags at ON at.tag_id = t.id
            JOIN articles a ON a.id = at.article_id
            WHERE a.slug = ?1
            ORDER BY t.name
            "#,
        )?;

        let rows = stmt.query_map([slug], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .context("Failed to read article tags")
    }

    /// External links attached to an article, sorted
    pub fn article_links(&self, slug: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT l.url FROM article_links l
            JOIN articles a ON a.id = l.article_id
            WHERE a.slug = ?1
            ORDER BY l.url
            "#,
        )?;

        let rows = stmt.query_map([slug], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .context("Failed to read article links")
    }

    // ==================== Administration ====================

    /// Delete every row, children first
    pub fn clear(&mut self) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("Failed to start transaction")?;

        for table in CLEAR_ORDER {
            tx.execute(&format!("DELETE FROM {}", table), [])
                .with_context(|| format!("Failed to clear table {}", table))?;
        }

        tx.commit().context("Failed to commit clear")?;
        info!("Database cleared");
        Ok(())
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn stats(&self) -> Result<DatabaseStats> {
        Ok(DatabaseStats {
            specialties: self.count("specialties")?,
            technologies: self.count("technologies")?,
            associations: self.count("specialty_technology")?,
            articles: self.count("articles")?,
            tags: self.count("tags")?,
            article_tags: self.count("article_tags")?,
            article_links: self.count("article_links")?,
        })
    }

    fn count(&self, table: &str) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .with_context(|| format!("Failed to count {}", table))?;
        Ok(count as usize)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl HashSource for Database {
    fn file_hashes(&self) -> Result<BTreeMap<String, String>> {
        Database::file_hashes(self)
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub specialties: usize,
    pub technologies: usize,
    pub associations: usize,
    pub articles: usize,
    pub tags: usize,
    pub article_tags: usize,
    pub article_links: usize,
}

/// Stored article with resolved specialty and technology names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleSummary {
    pub slug: String,
    pub title: String,
    pub specialty: String,
    pub technology: String,
    pub priority: i64,
    pub file_hash: Option<String>,
}
