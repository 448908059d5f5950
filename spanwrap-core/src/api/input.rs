//! Markup sources accepted by the string entry points

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::markup::{self, Markup};

/// Where markup comes from
pub enum Input {
    /// Markup text
    Text(String),
    /// File on disk
    File(PathBuf),
    /// Raw bytes, expected to be UTF-8
    Bytes(Vec<u8>),
    /// Any reader (boxed for object safety)
    Reader(Box<dyn Read + Send + Sync>),
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Input::Text(text) => f
                .debug_struct("Input::Text")
                .field("length", &text.len())
                .finish(),
            Input::File(path) => f.debug_struct("Input::File").field("path", path).finish(),
            Input::Bytes(bytes) => f
                .debug_struct("Input::Bytes")
                .field("length", &bytes.len())
                .finish(),
            Input::Reader(_) => f.debug_struct("Input::Reader").finish(),
        }
    }
}

impl Input {
    pub fn from_text(text: impl Into<String>) -> Self {
        Input::Text(text.into())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Input::File(path.as_ref().to_path_buf())
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Input::Bytes(bytes)
    }

    pub fn from_reader(reader: impl Read + Send + Sync + 'static) -> Self {
        Input::Reader(Box::new(reader))
    }

    /// Read the whole source as text
    pub fn into_text(self) -> Result<String> {
        let bytes = match self {
            Input::Text(text) => return Ok(text),
            Input::Bytes(bytes) => bytes,
            Input::File(path) => std::fs::read(&path).map_err(|e| {
                Error::Parse(format!("Failed to read file {}: {e}", path.display()))
            })?,
            Input::Reader(mut reader) => {
                let mut buffer = Vec::new();
                reader
                    .read_to_end(&mut buffer)
                    .map_err(|e| Error::Parse(format!("Failed to read from reader: {e}")))?;
                buffer
            }
        };
        String::from_utf8(bytes).map_err(|e| Error::Parse(format!("Invalid UTF-8 encoding: {e}")))
    }

    /// Read and parse the source
    pub fn into_markup(self) -> Result<Markup> {
        markup::parse(&self.into_text()?)
    }
}
