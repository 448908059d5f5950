//! Error handling for the CLI application

use std::fmt;
use std::path::PathBuf;

/// User-facing failures the CLI reports without a backtrace of causes
#[derive(Debug)]
pub enum CliError {
    /// No file matched the given patterns
    NoInputFiles(Vec<String>),
    /// Glob pattern that cannot be compiled
    InvalidPattern(String),
    /// Configuration file rejected by the core
    InvalidConfig { path: PathBuf, reason: String },
    /// One input could not be segmented
    Segmentation { source: String, reason: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NoInputFiles(patterns) => {
                write!(f, "No files found matching: {}", patterns.join(", "))
            }
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::InvalidConfig { path, reason } => {
                write!(f, "Invalid configuration {}: {reason}", path.display())
            }
            CliError::Segmentation { source, reason } => {
                write!(f, "Failed to segment {source}: {reason}")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
