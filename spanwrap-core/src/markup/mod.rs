//! Bridge between markup text and the [`Document`] arena
//!
//! Parsing goes through html5ever and is error-recovering: malformed tags
//! are fixed up the way a browser would, so only I/O failures surface as
//! [`Error::Parse`](crate::Error::Parse).

mod parse;
mod serialize;

pub use parse::{parse, parse_reader};
pub use serialize::serialize_children;

use crate::domain::tree::Document;
use crate::error::Result;

/// Shape of the parsed input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupKind {
    /// Loose content; head and body children sit directly under the root
    Fragment,
    /// Complete document rooted at `<html>`
    Document,
}

/// Parsed markup
#[derive(Debug, Clone)]
pub struct Markup {
    pub document: Document,
    pub kind: MarkupKind,
    pub doctype: Option<String>,
}

impl Markup {
    /// Serialize the document back to markup text
    pub fn to_html(&self) -> Result<String> {
        let body = serialize_children(&self.document, self.document.root())?;
        Ok(match &self.doctype {
            Some(name) => format!("<!DOCTYPE {name}>{body}"),
            None => body,
        })
    }
}
