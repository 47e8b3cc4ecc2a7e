//! docsync - Markdown knowledge base to relational catalogue sync
//!
//! This library scans a tree of Markdown documents, resolves each one to a
//! technology and specialty through YAML mappings, detects changes by content
//! hash and persists the result into a normalized SQLite schema.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod scan;
pub mod storage;
pub mod sync;

/// Re-export commonly used types
pub use config::{DatabaseConfig, ScanConfig, Settings};
pub use error::SyncError;
pub use extract::{content_hash, Document, DocumentExtractor};
pub use scan::{scan_documents, TreeScanner};
pub use storage::Database;
pub use sync::{resolve_changes, ChangeKind, ChangeSet};

/// Application-wide error type
pub use anyhow::Result;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "docsync";
