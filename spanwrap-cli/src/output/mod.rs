//! Output formatting module

use anyhow::Result;
use serde::Serialize;
use spanwrap_core::SegmentReport;

/// One segmented input, ready to be written
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    /// File name, or `<stdin>`
    pub source: String,
    /// Segmented markup
    pub html: String,
    pub report: SegmentReport,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Format and output a single document
    fn format_document(&mut self, document: &ProcessedDocument) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod html;
pub mod json;

pub use html::HtmlFormatter;
pub use json::JsonFormatter;
