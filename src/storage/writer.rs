//! Persistence of scanned documents
//!
//! All writes for one batch go through a single transaction. Specialties and
//! technologies are upserted first so every article references rows of the
//! same transaction.

use super::ids::IdTable;
use crate::extract::{article_slug, name_slug, Document};
use crate::mapping::{SpecialtyMapping, TechnologyMapping};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// What one write pass touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub specialties: usize,
    pub technologies: usize,
    pub associations: usize,
    pub articles: usize,
    /// Document/specialty pairs skipped for a missing technology or specialty
    pub skipped: usize,
}

/// Write `documents` and the mappings through `conn`.
///
/// Callers pass a transaction; nothing here commits.
pub fn write_documents(
    conn: &Connection,
    documents: &[Document],
    technologies: &TechnologyMapping,
    specialties: &SpecialtyMapping,
) -> Result<SaveReport> {
    let mut report = SaveReport::default();

    let specialty_ids = upsert_specialties(conn, technologies, specialties)?;
    report.specialties = specialty_ids.row_count();

    let technology_ids = upsert_technologies(conn, documents, technologies)?;
    report.technologies = technology_ids.row_count();

    report.associations = link_technologies(conn, technologies, &specialty_ids, &technology_ids)?;

    for document in documents {
        let Some(technology_id) = technology_ids.get(&document.technology) else {
            warn!(
                "Skipping article {:?}: technology {:?} not found",
                document.title, document.technology
            );
            report.skipped += 1;
            continue;
        };

        let targets = match technologies.get(&document.technology) {
            Some(entry) => entry.specialty_names(),
            None => vec![document.specialty.clone()],
        };

        for specialty in &targets {
            let Some(specialty_id) = specialty_ids.get(specialty) else {
                warn!(
                    "Skipping article {:?} for specialty {:?}: specialty not found",
                    document.title, specialty
                );
                report.skipped += 1;
                continue;
            };

            let article_id = upsert_article(conn, document, specialty, specialty_id, technology_id)?;
            replace_tags(conn, article_id, &document.tags)?;
            replace_links(conn, article_id, &document.links)?;
            report.articles += 1;
        }
    }

    Ok(report)
}

// ==================== Specialties & Technologies ====================

fn upsert_specialties(
    conn: &Connection,
    technologies: &TechnologyMapping,
    specialties: &SpecialtyMapping,
) -> Result<IdTable> {
    let mut ids = IdTable::new();
    // slug -> row id; names sharing a slug share one row
    let mut rows: HashMap<String, i64> = HashMap::new();

    for (name, entry) in specialties {
        let slug = name_slug(name);
        if let Some(&id) = rows.get(&slug) {
            debug!("Specialty {:?} shares slug {:?} with an earlier entry", name, slug);
            ids.insert(name, id);
            continue;
        }
        let id = upsert_specialty(conn, name, entry.priority())?;
        rows.insert(slug, id);
        ids.insert(name, id);
    }

    // specialties only referenced from the technology mapping
    for entry in technologies.values() {
        for name in entry.specialty_names() {
            if ids.contains(&name) {
                continue;
            }
            let slug = name_slug(&name);
            if let Some(&id) = rows.get(&slug) {
                ids.insert(&name, id);
                continue;
            }
            let id = upsert_specialty(conn, &name, entry.priority())?;
            rows.insert(slug, id);
            ids.insert(&name, id);
        }
    }

    debug!("Upserted {} specialties", rows.len());
    Ok(ids)
}

fn upsert_specialty(conn: &Connection, name: &str, priority: i64) -> Result<i64> {
    conn.query_row(
        r#"
        INSERT INTO specialties (name, slug, priority) VALUES (?1, ?2, ?3)
        ON CONFLICT(slug) DO UPDATE SET
            name = excluded.name,
            priority = excluded.priority
        RETURNING id
        "#,
        params![name, name_slug(name), priority],
        |row| row.get(0),
    )
    .with_context(|| format!("Failed to upsert specialty {:?}", name))
}

fn upsert_technologies(
    conn: &Connection,
    documents: &[Document],
    technologies: &TechnologyMapping,
) -> Result<IdTable> {
    let mut ids = IdTable::new();

    for document in documents {
        if ids.contains(&document.technology) {
            continue;
        }
        let id = upsert_technology(conn, &document.technology, document.priority)?;
        ids.insert(&document.technology, id);
    }

    // technologies with no scanned document
    for (name, entry) in technologies {
        if ids.contains(name) {
            continue;
        }
        let id = upsert_technology(conn, name, entry.priority())?;
        ids.insert(name, id);
    }

    debug!("Upserted {} technologies", ids.len());
    Ok(ids)
}

fn upsert_technology(conn: &Connection, name: &str, priority: i64) -> Result<i64> {
    conn.query_row(
        r#"
        INSERT INTO technologies (name, slug, priority) VALUES (?1, ?2, ?3)
        ON CONFLICT(slug) DO UPDATE SET
            name = excluded.name,
            priority = excluded.priority
        RETURNING id
        "#,
        params![name, name_slug(name), priority],
        |row| row.get(0),
    )
    .with_context(|| format!("Failed to upsert technology {:?}", name))
}

fn link_technologies(
    conn: &Connection,
    technologies: &TechnologyMapping,
    specialty_ids: &IdTable,
    technology_ids: &IdTable,
) -> Result<usize> {
    let mut linked = 0;

    for (name, technology_id) in technology_ids.iter() {
        let Some(entry) = technologies.get(name) else {
            continue;
        };

        for specialty in entry.specialty_names() {
            let Some(specialty_id) = specialty_ids.get(&specialty) else {
                continue;
            };

            conn.execute(
                r#"
                INSERT INTO specialty_technology (specialty_id, technology_id, name)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(specialty_id, technology_id) DO UPDATE SET name = excluded.name
                "#,
                params![specialty_id, technology_id, name],
            )
            .with_context(|| format!("Failed to link {:?} with {:?}", name, specialty))?;
            linked += 1;
        }
    }

    debug!("Linked {} specialty/technology pairs", linked);
    Ok(linked)
}

// ==================== Articles ====================

fn upsert_article(
    conn: &Connection,
    document: &Document,
    specialty: &str,
    specialty_id: i64,
    technology_id: i64,
) -> Result<i64> {
    let slug = article_slug(&document.id, specialty);

    conn.query_row(
        r#"
        INSERT INTO articles (
            title, slug, content, specialty_id, technology_id,
            priority, description, file_hash
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(slug) DO UPDATE SET
            title = excluded.title,
            content = excluded.content,
            specialty_id = excluded.specialty_id,
            technology_id = excluded.technology_id,
            priority = excluded.priority,
            description = excluded.description,
            file_hash = excluded.file_hash,
            updated_at = CURRENT_TIMESTAMP
        RETURNING id
        "#,
        params![
            document.title,
            slug,
            document.content,
            specialty_id,
            technology_id,
            document.priority,
            document.description,
            document.content_hash,
        ],
        |row| row.get(0),
    )
    .with_context(|| format!("Failed to upsert article {:?}", slug))
}

fn replace_tags(conn: &Connection, article_id: i64, tags: &[String]) -> Result<()> {
    conn.execute(
        "DELETE FROM article_tags WHERE article_id = ?1",
        params![article_id],
    )
    .context("Failed to clear article tags")?;

    for tag in tags {
        let tag_id: i64 = conn
            .query_row(
                r#"
                INSERT INTO tags (name) VALUES (?1)
                ON CONFLICT(name) DO UPDATE SET name = excluded.name
                RETURNING id
                "#,
                params![tag],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to upsert tag {:?}", tag))?;

        conn.execute(
            r#"
            INSERT INTO article_tags (article_id, tag_id) VALUES (?1, ?2)
            ON CONFLICT(article_id, tag_id) DO NOTHING
            "#,
            params![article_id, tag_id],
        )
        .with_context(|| format!("Failed to tag article with {:?}", tag))?;
    }

    Ok(())
}

fn replace_links(conn: &Connection, article_id: i64, links: &[String]) -> Result<()> {
    conn.execute(
        "DELETE FROM article_links WHERE article_id = ?1",
        params![article_id],
    )
    .context("Failed to clear article links")?;

    for url in links {
        conn.execute(
            r#"
            INSERT INTO article_links (article_id, url) VALUES (?1, ?2)
            ON CONFLICT(article_id, url) DO NOTHING
            "#,
            params![article_id, url],
        )
        .with_context(|| format!("Failed to insert link {:?}", url))?;
    }

    Ok(())
}
