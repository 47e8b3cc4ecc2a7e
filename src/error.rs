//! Typed errors for the scanning side of docsync

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading configuration and scanning the docs tree
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Directory {0} not found")]
    DirectoryNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Settings error in {path}: {message}")]
    Settings { path: PathBuf, message: String },
}

/// Result type alias for scanning operations
pub type Result<T> = std::result::Result<T, SyncError>;
