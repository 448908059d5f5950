//! Reading markup from files and standard input

use anyhow::{Context, Result};
use spanwrap_core::Input;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File reader with UTF-8 validation
pub struct FileReader;

impl FileReader {
    /// Read a file as UTF-8 text
    pub fn read_text(path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }
}

/// Where one document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// Name used in logs, progress and JSON output
    pub fn name(&self) -> String {
        match self {
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::File(path) => path.display().to_string(),
        }
    }

    /// Open the source as segmentation input
    pub fn open(&self) -> Result<Input> {
        match self {
            InputSource::Stdin => Ok(Input::from_reader(io::stdin())),
            InputSource::File(path) => FileReader::read_text(path).map(Input::from_text),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
