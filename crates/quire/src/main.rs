//! Quire CLI - documentation content indexer.
//!
//! Provides commands for:
//! - `index`: Extract page data and print the page index as JSON
//! - `llms`: Print `llms.txt` or `llms-full.txt`

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{IndexArgs, LlmsArgs};
use output::Output;

/// Quire - documentation content indexer.
#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the page index as JSON.
    Index(IndexArgs),
    /// Print a plain-text export of the site for language models.
    Llms(LlmsArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Index(args) => args.site.verbose,
            Self::Llms(args) => args.site.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Runtime::new()
        .map_err(error::CliError::from)
        .and_then(|rt| {
            rt.block_on(async {
                match cli.command {
                    Commands::Index(args) => args.execute().await,
                    Commands::Llms(args) => args.execute().await,
                }
            })
        });

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
