//! Postcraft CLI
//!
//! Checks and normalizes persisted posts

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "postcraft")]
#[command(about = "Structured post editor tooling", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report dropped elements and colored link text
    Check(commands::CheckArgs),

    /// Reload posts and write them back in canonical form
    Normalize(commands::NormalizeArgs),

    /// List registered node and mark types
    Types(commands::TypesArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("POSTCRAFT_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => commands::check(args),
        Commands::Normalize(args) => commands::normalize(args),
        Commands::Types(args) => commands::types(args),
    }
}
