//! spanwrap command-line entry point

use clap::Parser;
use spanwrap_cli::commands::Commands;

/// Wrap letters, words, speaking units and sentences of markup in elements
#[derive(Debug, Parser)]
#[command(name = "spanwrap", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    Cli::parse().command.execute()
}
