//! Markup output formatter

use super::{OutputFormatter, ProcessedDocument};
use anyhow::Result;
use std::io::{self, Write};

/// Writes each document's segmented markup followed by a newline
pub struct HtmlFormatter<W: Write> {
    writer: W,
}

impl<W: Write> HtmlFormatter<W> {
    /// Create a new markup formatter
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl HtmlFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + Sync> OutputFormatter for HtmlFormatter<W> {
    fn format_document(&mut self, document: &ProcessedDocument) -> Result<()> {
        writeln!(self.writer, "{}", document.html)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
