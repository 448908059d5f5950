//! Validate command implementation

use anyhow::Result;
use clap::Args;
use spanwrap_core::{ConfigFile, SegmentationConfig};
use std::path::PathBuf;

use crate::error::CliError;

/// Arguments for the validate command
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Path to the configuration file to validate
    #[arg(short, long, value_name = "FILE", required = true)]
    pub config: PathBuf,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> Result<()> {
        println!("Validating configuration: {}", self.config.display());

        match self.load() {
            Ok(config) => {
                for line in summary(&config) {
                    println!("  {line}");
                }
                println!("✓ Configuration is valid!");
                Ok(())
            }
            Err(e) => {
                println!("✗ Configuration is invalid!");
                println!("  Error: {e}");
                Err(CliError::InvalidConfig {
                    path: self.config.clone(),
                    reason: e.to_string(),
                }
                .into())
            }
        }
    }

    fn load(&self) -> spanwrap_core::Result<SegmentationConfig> {
        ConfigFile::from_file(&self.config)?.into_config()
    }
}

/// Human-readable description of the effective settings
fn summary(config: &SegmentationConfig) -> Vec<String> {
    let identifiers = if config.assign_identifiers() {
        config.identifier_attribute().to_string()
    } else {
        "off".to_string()
    };
    vec![
        format!("Modes: {}", config.modes()),
        format!("Wrapper tag: {}", config.wrapper_tag()),
        format!("Identifiers: {identifiers}"),
        format!("Labels: {}", if config.use_labels() { "on" } else { "off" }),
        format!("Alphabet: {}", config.classifier().config().alphabet.name()),
    ]
}
