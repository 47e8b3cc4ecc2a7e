//! Settings for docsync
//!
//! Everything the scanner and the store need is carried by explicit structs.
//! A TOML settings file can provide them; CLI flags override it.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default settings file name
pub const SETTINGS_FILE: &str = "docsync.toml";

/// What to scan and which mappings to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Root of the Markdown tree
    pub docs_path: PathBuf,
    /// Technology mapping YAML
    pub technology_path: PathBuf,
    /// Specialty mapping YAML
    pub specialties_path: Option<PathBuf>,
}

/// Where the relational store lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database file
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// File-backed settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Root of the Markdown tree
    #[serde(default = "default_docs_path")]
    pub docs_path: PathBuf,

    /// Directory holding the mapping files
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Technology mapping file name inside `config_dir`
    #[serde(default = "default_technology_file")]
    pub technology_file: String,

    /// Specialty mapping file name inside `config_dir`
    #[serde(default = "default_specialties_file")]
    pub specialties_file: String,

    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
}

fn default_docs_path() -> PathBuf {
    PathBuf::from("./docs")
}

fn default_config_dir() -> PathBuf {
    PathBuf::from("./config")
}

fn default_technology_file() -> String {
    "category-mapping.yaml".to_string()
}

fn default_specialties_file() -> String {
    "specialties.yaml".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./docsync.db")
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            docs_path: default_docs_path(),
            config_dir: default_config_dir(),
            technology_file: default_technology_file(),
            specialties_file: default_specialties_file(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or return defaults when the file is absent
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SyncError::Settings {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the technology mapping file
    pub fn technology_path(&self) -> PathBuf {
        self.config_dir.join(&self.technology_file)
    }

    /// Path of the specialty mapping file
    pub fn specialties_path(&self) -> PathBuf {
        self.config_dir.join(&self.specialties_file)
    }

    /// Scan configuration derived from these settings
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            docs_path: self.docs_path.clone(),
            technology_path: self.technology_path(),
            specialties_path: Some(self.specialties_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.docs_path, PathBuf::from("./docs"));
        assert_eq!(
            settings.technology_path(),
            PathBuf::from("./config/category-mapping.yaml")
        );
        assert_eq!(
            settings.specialties_path(),
            PathBuf::from("./config/specialties.yaml")
        );
        assert_eq!(settings.database.path, PathBuf::from("./docsync.db"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load_or_default(&tmp.path().join(SETTINGS_FILE)).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        fs::write(
            &path,
            "docs_path = \"/srv/wiki\"\n\n[database]\npath = \"/var/lib/docsync.db\"\n",
        )
        .unwrap();

        let settings = Settings::load_or_default(&path).unwrap();
        assert_eq!(settings.docs_path, PathBuf::from("/srv/wiki"));
        assert_eq!(settings.database.path, PathBuf::from("/var/lib/docsync.db"));
        assert_eq!(settings.technology_file, "category-mapping.yaml");

        let scan = settings.scan_config();
        assert_eq!(scan.docs_path, PathBuf::from("/srv/wiki"));
        assert_eq!(
            scan.specialties_path,
            Some(PathBuf::from("./config/specialties.yaml"))
        );
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(SETTINGS_FILE);
        fs::write(&path, "docs_path = [").unwrap();

        let err = Settings::load_or_default(&path).unwrap_err();
        assert!(matches!(err, SyncError::Settings { .. }));
    }
}
