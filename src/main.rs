//! docsync - Markdown knowledge base to relational catalogue sync tool
//!
//! Scans a tree of Markdown documents, classifies them against the last
//! sync by content hash and upserts them into SQLite.

use anyhow::Result;
use docsync::cli::{check, clear, init, parse, update, Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = cli.run_config()?;

    // Execute command
    match cli.command {
        Commands::Init => init(&config.database, cli.format)?,
        Commands::Clear => clear(&config.database, cli.format)?,
        Commands::Parse(args) => parse(&config, args.clear, args.check_only, cli.format)?,
        Commands::Check => check(&config, cli.format)?,
        Commands::Update(args) => update(&config, args.force, cli.format)?,
    }

    Ok(())
}
