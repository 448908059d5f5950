//! File pattern resolution using glob

use anyhow::{Context, Result};
use glob::glob;
use std::path::PathBuf;

use super::InputSource;
use crate::error::CliError;

/// Pattern standing for standard input
pub const STDIN_PATTERN: &str = "-";

/// Resolve patterns to input sources, in pattern order
///
/// No pattern at all, or `-`, means standard input. Files matched by more
/// than one pattern are read once.
pub fn resolve_patterns(patterns: &[String]) -> Result<Vec<InputSource>> {
    if patterns.is_empty() {
        return Ok(vec![InputSource::Stdin]);
    }

    let mut sources = Vec::new();
    let mut seen: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        if pattern == STDIN_PATTERN {
            if !sources.contains(&InputSource::Stdin) {
                sources.push(InputSource::Stdin);
            }
            continue;
        }

        let paths = glob(pattern).map_err(|_| CliError::InvalidPattern(pattern.clone()))?;
        let mut matched: Vec<PathBuf> = Vec::new();
        for path_result in paths {
            let path =
                path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;
            if path.is_file() {
                matched.push(path);
            }
        }
        matched.sort();

        for path in matched {
            if !seen.contains(&path) {
                seen.push(path.clone());
                sources.push(InputSource::File(path));
            }
        }
    }

    if sources.is_empty() {
        return Err(CliError::NoInputFiles(patterns.to_vec()).into());
    }
    Ok(sources)
}
