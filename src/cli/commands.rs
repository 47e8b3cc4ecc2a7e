//! Command implementations

use super::{OutputFormat, RunConfig};
use crate::config::DatabaseConfig;
use crate::extract::Document;
use crate::scan::TreeScanner;
use crate::storage::{Database, DatabaseStats, SaveReport};
use crate::sync::{resolve_changes, ChangeKind, ChangeSet, ChangeSummary, ChangedDocument, HashSource};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Report printed by `init` and `clear`
#[derive(Debug, Serialize)]
pub struct DatabaseReport {
    pub database: String,
    pub stats: DatabaseStats,
}

/// Report printed by `check` and `parse --check-only`
#[derive(Debug, Serialize)]
pub struct CheckReport {
    #[serde(flatten)]
    pub summary: ChangeSummary,
    pub degraded: bool,
    pub documents: Vec<ChangedDocument>,
}

/// Report printed by `parse` and `update`
#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub scanned: usize,
    pub changes: Option<ChangeSummary>,
    pub saved: SaveReport,
}

/// Create the database schema
pub fn init(config: &DatabaseConfig, format: OutputFormat) -> Result<()> {
    let db = open_database(&config.path)?;
    let report = DatabaseReport {
        database: config.path.display().to_string(),
        stats: db.stats()?,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            println!("✓ Initialized database at {:?}", config.path);
            print_stats_text(&report.stats);
        }
    }

    Ok(())
}

/// Delete all synced data
pub fn clear(config: &DatabaseConfig, format: OutputFormat) -> Result<()> {
    let mut db = open_database(&config.path)?;
    db.clear()?;

    let report = DatabaseReport {
        database: config.path.display().to_string(),
        stats: db.stats()?,
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => println!("✓ Cleared database at {:?}", config.path),
    }

    Ok(())
}

/// Scan the docs tree and persist every document
pub fn parse(config: &RunConfig, clear: bool, check_only: bool, format: OutputFormat) -> Result<()> {
    let (scanner, documents) = scan(config)?;

    if check_only {
        let changes = resolve_with_store(config, documents);
        return print_check(&changes, format);
    }

    let mut db = open_database(&config.database.path)?;
    if clear {
        db.clear()?;
    }

    let scanned = documents.len();
    let saved = db.save_documents(&documents, scanner.technologies(), &scanner.specialties())?;

    print_sync(
        &SyncReport {
            scanned,
            changes: None,
            saved,
        },
        format,
    )
}

/// Report which documents changed since the last sync
pub fn check(config: &RunConfig, format: OutputFormat) -> Result<()> {
    let (_, documents) = scan(config)?;
    let changes = resolve_with_store(config, documents);
    print_check(&changes, format)
}

/// Persist new and changed documents, or everything with `force`
pub fn update(config: &RunConfig, force: bool, format: OutputFormat) -> Result<()> {
    let (scanner, documents) = scan(config)?;
    let mut db = open_database(&config.database.path)?;
    let scanned = documents.len();

    let (to_save, changes) = if force {
        (documents, None)
    } else {
        let changes = resolve_changes(documents, &db);
        if format == OutputFormat::Text {
            for entry in changes.entries.iter().filter(|e| e.kind.needs_update()) {
                println!("  {} {}", kind_marker(entry.kind), entry.path);
            }
        }
        let summary = changes.summary();
        (changes.to_update, Some(summary))
    };

    let saved = if to_save.is_empty() {
        SaveReport::default()
    } else {
        db.save_documents(&to_save, scanner.technologies(), &scanner.specialties())?
    };

    print_sync(
        &SyncReport {
            scanned,
            changes,
            saved,
        },
        format,
    )
}

// ==================== Helpers ====================

fn open_database(path: &Path) -> Result<Database> {
    Database::open(path).with_context(|| format!("Failed to open database {:?}", path))
}

fn scan(config: &RunConfig) -> Result<(TreeScanner, Vec<Document>)> {
    let scanner = TreeScanner::from_config(&config.scan);
    let documents = scanner
        .scan(&config.scan.docs_path)
        .with_context(|| format!("Failed to scan {:?}", config.scan.docs_path))?;
    Ok((scanner, documents))
}

/// Store that could not be opened; resolving against it fails open
struct UnavailableStore(anyhow::Error);

impl HashSource for UnavailableStore {
    fn file_hashes(&self) -> Result<BTreeMap<String, String>> {
        Err(anyhow::anyhow!("{:#}", self.0))
    }
}

fn resolve_with_store(config: &RunConfig, documents: Vec<Document>) -> ChangeSet {
    match Database::open_read_only(&config.database.path) {
        Ok(db) => resolve_changes(documents, &db),
        Err(e) => {
            warn!("Database {:?} unavailable", config.database.path);
            resolve_changes(documents, &UnavailableStore(e))
        }
    }
}

fn kind_marker(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::New => "+",
        ChangeKind::Changed => "~",
        ChangeKind::Unchanged => " ",
    }
}

// ==================== Output ====================

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a change set
pub fn print_check(changes: &ChangeSet, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(&CheckReport {
            summary: changes.summary(),
            degraded: changes.degraded,
            documents: changes.entries.clone(),
        }),
        OutputFormat::Text => {
            print_check_text(changes);
            Ok(())
        }
    }
}

/// Print a change set in text format
pub fn print_check_text(changes: &ChangeSet) {
    for entry in changes.entries.iter().filter(|e| e.kind.needs_update()) {
        println!("  {} {} ({})", kind_marker(entry.kind), entry.path, entry.kind);
    }

    println!("\nStatistics:");
    println!("  Total files: {}", changes.total);
    println!("  To update: {}", changes.to_update.len());
    println!("  Unchanged: {}", changes.unchanged);

    if changes.degraded {
        println!("\n⚠ Stored hashes unavailable, every document counted as changed");
    }

    if changes.is_empty() {
        println!("\n✓ Nothing to update");
    } else {
        println!("\n{} file(s) to update", changes.to_update.len());
    }
}

fn print_sync(report: &SyncReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Text => {
            println!("Scanned {} document(s)", report.scanned);
            if let Some(ref changes) = report.changes {
                println!("  To update: {}", changes.to_update);
                println!("  Unchanged: {}", changes.unchanged);
            }
            if report.saved.articles == 0 && report.saved.skipped == 0 {
                println!("✓ Nothing to save");
            } else {
                println!(
                    "✓ Saved {} article(s) ({} skipped)",
                    report.saved.articles, report.saved.skipped
                );
            }
            Ok(())
        }
    }
}

fn print_stats_text(stats: &DatabaseStats) {
    println!("  Specialties: {}", stats.specialties);
    println!("  Technologies: {}", stats.technologies);
    println!("  Articles: {}", stats.articles);
    println!("  Tags: {}", stats.tags);
}
