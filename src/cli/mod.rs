//! CLI interface using clap
//!
//! Provides the command-line interface for docsync

mod commands;

pub use commands::*;

use crate::config::{DatabaseConfig, ScanConfig, Settings, SETTINGS_FILE};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docsync - sync a Markdown knowledge base into a relational catalogue
#[derive(Parser, Debug)]
#[command(name = "docsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root of the Markdown docs tree
    #[arg(short, long, global = true, env = "DOCSYNC_DOCS")]
    pub path: Option<PathBuf>,

    /// Directory holding the mapping files
    #[arg(short, long, global = true, env = "DOCSYNC_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Technology mapping file (overrides the one in the config directory)
    #[arg(long, global = true)]
    pub technologies: Option<PathBuf>,

    /// Specialty mapping file (overrides the one in the config directory)
    #[arg(long, global = true)]
    pub specialties: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "DOCSYNC_DB")]
    pub database: Option<PathBuf>,

    /// Settings file
    #[arg(long, global = true, env = "DOCSYNC_SETTINGS", default_value = SETTINGS_FILE)]
    pub settings: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the database schema
    Init,

    /// Delete all synced data
    Clear,

    /// Scan the docs tree and persist every document
    Parse(ParseArgs),

    /// Report which documents changed since the last sync
    Check,

    /// Persist only new and changed documents
    Update(UpdateArgs),
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for parse command
#[derive(Parser, Debug)]
pub struct ParseArgs {
    /// Clear the database before saving
    #[arg(long)]
    pub clear: bool,

    /// Only report what would change, save nothing
    #[arg(long)]
    pub check_only: bool,
}

/// Arguments for update command
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Save every scanned document, changed or not
    #[arg(short, long)]
    pub force: bool,
}

/// Fully resolved configuration for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub scan: ScanConfig,
    pub database: DatabaseConfig,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Load the settings file and apply the command line overrides
    pub fn run_config(&self) -> Result<RunConfig> {
        let mut settings = Settings::load_or_default(&self.settings)
            .with_context(|| format!("Failed to load settings from {:?}", self.settings))?;

        if let Some(ref path) = self.path {
            settings.docs_path = path.clone();
        }
        if let Some(ref dir) = self.config_dir {
            settings.config_dir = dir.clone();
        }
        if let Some(ref database) = self.database {
            settings.database.path = database.clone();
        }

        let mut scan = settings.scan_config();
        if let Some(ref technologies) = self.technologies {
            scan.technology_path = technologies.clone();
        }
        if let Some(ref specialties) = self.specialties {
            scan.specialties_path = Some(specialties.clone());
        }

        Ok(RunConfig {
            scan,
            database: settings.database,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["docsync", "parse", "--clear"]);
        assert!(matches!(cli.command, Commands::Parse(_)));

        if let Commands::Parse(args) = cli.command {
            assert!(args.clear);
            assert!(!args.check_only);
        }
    }

    #[test]
    fn test_update_command() {
        let cli = Cli::parse_from(["docsync", "update", "--force", "-o", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
        if let Commands::Update(args) = cli.command {
            assert!(args.force);
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["docsync", "check", "-p", "/srv/docs", "--database", "x.db"]);
        assert!(matches!(cli.command, Commands::Check));
        assert_eq!(cli.path, Some(PathBuf::from("/srv/docs")));
        assert_eq!(cli.database, Some(PathBuf::from("x.db")));
    }

    #[test]
    fn test_run_config_defaults_and_overrides() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("docsync.toml");
        fs::write(&settings, "docs_path = \"/srv/wiki\"\nconfig_dir = \"/etc/docsync\"\n").unwrap();

        let cli = Cli::parse_from([
            "docsync",
            "check",
            "--settings",
            settings.to_str().unwrap(),
            "--specialties",
            "/tmp/specialties.yaml",
        ]);
        let config = cli.run_config().unwrap();

        assert_eq!(config.scan.docs_path, PathBuf::from("/srv/wiki"));
        assert_eq!(
            config.scan.technology_path,
            PathBuf::from("/etc/docsync/category-mapping.yaml")
        );
        assert_eq!(
            config.scan.specialties_path,
            Some(PathBuf::from("/tmp/specialties.yaml"))
        );
        assert_eq!(config.database.path, PathBuf::from("./docsync.db"));
    }

    #[test]
    fn test_run_config_rejects_broken_settings() {
        let tmp = TempDir::new().unwrap();
        let settings = tmp.path().join("docsync.toml");
        fs::write(&settings, "docs_path = [").unwrap();

        let cli = Cli::parse_from(["docsync", "init", "--settings", settings.to_str().unwrap()]);
        assert!(cli.run_config().is_err());
    }
}
