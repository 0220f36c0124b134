//! Lavka CLI - Catalog seeding and operations checks.
//!
//! # Usage
//!
//! ```bash
//! # Verify configuration and PostgREST connectivity
//! lavka-cli check
//!
//! # Seed the catalog from a YAML file
//! lavka-cli seed catalog.yaml
//!
//! # Validate a seed file without writing anything
//! lavka-cli seed catalog.yaml --dry-run
//!
//! # Send a test message to the order chat
//! lavka-cli notify-test
//! ```
//!
//! Every command reads the same environment the webapp reads (`.env`
//! included), so a working `check` means the webapp would start.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lavka-cli")]
#[command(author, version, about = "Lavka CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify configuration and PostgREST connectivity
    Check,
    /// Seed the product catalog from a YAML file
    Seed {
        /// Path to the YAML seed file
        file: String,

        /// Parse and validate only; insert nothing
        #[arg(long)]
        dry_run: bool,
    },
    /// Send a test message to the configured order chat
    NotifyTest {
        /// Message text (Markdown)
        #[arg(short, long, default_value = "Lavka notification test.")]
        text: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check => commands::check::run().await?,
        Commands::Seed { file, dry_run } => commands::seed::catalog(&file, dry_run).await?,
        Commands::NotifyTest { text } => commands::notify::test_message(&text).await?,
    }
    Ok(())
}
