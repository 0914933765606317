//! # ferry-cli
//!
//! Command-line interface for Ferry.
//!
//! - `ferry run` — apply a `ferry.toml` pipeline (or its reverse) to a checkout
//! - `ferry glob` — list checkout files matching a glob
//! - `ferry labels` — print the label footer of a change message

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Ferry — reversible transformations for code migration.
#[derive(Parser)]
#[command(name = "ferry", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a transformation pipeline to a checkout.
    Run {
        /// Checkout directory to transform.
        #[arg(long)]
        checkout: PathBuf,
        /// Pipeline definition.
        #[arg(long, default_value = "ferry.toml")]
        config: PathBuf,
        /// File holding the change message (empty message if omitted).
        #[arg(long)]
        message_file: Option<PathBuf>,
        /// Author as "Name <email>".
        #[arg(long)]
        author: Option<String>,
        /// JSON file with the source changes (`{"current": [...], "migrated": [...]}`).
        #[arg(long)]
        changes: Option<PathBuf>,
        /// Run the reversed pipeline instead.
        #[arg(long)]
        reverse: bool,
    },
    /// List checkout files matching a glob.
    Glob {
        /// Checkout directory to search.
        #[arg(long)]
        checkout: PathBuf,
        /// Include patterns.
        #[arg(required = true)]
        patterns: Vec<String>,
        /// Exclude patterns.
        #[arg(long)]
        exclude: Vec<String>,
    },
    /// Print the labels in a message footer.
    Labels {
        /// Message file (reads stdin if omitted).
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ferry_transform=info".parse()?)
                .add_directive("ferry=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Run {
            checkout,
            config,
            message_file,
            author,
            changes,
            reverse,
        } => commands::run::execute(&commands::run::RunArgs {
            checkout,
            config,
            message_file: message_file.as_deref(),
            author: author.as_deref(),
            changes: changes.as_deref(),
            reverse: *reverse,
        }),
        Commands::Glob {
            checkout,
            patterns,
            exclude,
        } => commands::glob::execute(checkout, patterns, exclude),
        Commands::Labels { file } => commands::labels::execute(file.as_deref()),
    }
}
