//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;
use spanwrap_core::{Alphabet, Mode};

pub mod generate_config;
pub mod process;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment markup files and write the wrapped markup
    Process(process::ProcessArgs),

    /// Check a configuration file
    Validate(validate::ValidateArgs),

    /// Write a configuration template with every default spelled out
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ListCommands {
    /// List segmentation modes
    Modes,

    /// List output formats
    Formats,

    /// List letter alphabets
    Alphabets,
}

impl Commands {
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Process(args) => args.execute(),
            Commands::Validate(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::List { subcommand } => {
                for line in subcommand.lines() {
                    println!("{line}");
                }
                Ok(())
            }
        }
    }
}

impl ListCommands {
    /// One `name  description` line per entry
    pub fn lines(self) -> Vec<String> {
        match self {
            ListCommands::Modes => Mode::ALL
                .iter()
                .map(|mode| format!("{:<12} {}", mode.name(), mode.description()))
                .collect(),
            ListCommands::Formats => process::OutputFormat::ALL
                .iter()
                .map(|format| format!("{:<12} {}", format.name(), format.description()))
                .collect(),
            ListCommands::Alphabets => [
                (Alphabet::Unicode, "Unicode alphabetic characters (default)"),
                (
                    Alphabet::UnicodeAlphanumeric,
                    "Unicode alphabetic and numeric characters",
                ),
                (Alphabet::Ascii, "a-z and A-Z only"),
            ]
            .iter()
            .map(|(alphabet, description)| format!("{:<22} {description}", alphabet.name()))
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_modes() {
        let lines = ListCommands::Modes.lines();
        assert_eq!(lines.len(), Mode::ALL.len());
        assert!(lines[0].starts_with("letter"));
        assert!(lines.iter().any(|line| line.starts_with("speaking")));
    }

    #[test]
    fn test_list_formats() {
        let lines = ListCommands::Formats.lines();
        assert!(lines.iter().any(|line| {
            line.starts_with("html") && line.ends_with("each document followed by a newline")
        }));
        assert!(lines.iter().any(|line| line.starts_with("json")));
    }

    #[test]
    fn test_list_alphabets() {
        let lines = ListCommands::Alphabets.lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("unicode-alphanumeric"));
    }

    #[test]
    fn test_commands_debug_format() {
        let list_cmd = Commands::List {
            subcommand: ListCommands::Modes,
        };
        let debug_str = format!("{:?}", list_cmd);
        assert!(debug_str.contains("List"));
        assert!(debug_str.contains("Modes"));
    }
}
