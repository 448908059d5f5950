//! Markup text into a [`Document`]

use std::io::Read;

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData as DomData, RcDom};
use tracing::debug;

use super::{Markup, MarkupKind};
use crate::domain::tree::{Document, Element, MarkupTree, NodeId};
use crate::error::{Error, Result};

/// Parse markup text
///
/// Input that carries an `<html>` element or a doctype keeps its document
/// structure; anything else is treated as a fragment and the content of
/// `<head>` and `<body>` lands directly under the root.
pub fn parse(input: &str) -> Result<Markup> {
    let kind = detect_kind(input);
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(input);

    let mut document = Document::new();
    let root = document.root();
    let mut doctype = None;

    for child in dom.document.children.borrow().iter() {
        match &child.data {
            DomData::Doctype { name, .. } => doctype = Some(name.to_string()),
            DomData::Element { .. } if kind == MarkupKind::Fragment => {
                for section in child.children.borrow().iter() {
                    for node in section.children.borrow().iter() {
                        import(&mut document, root, node);
                    }
                }
            }
            _ if kind == MarkupKind::Document => import(&mut document, root, child),
            _ => {}
        }
    }

    debug!(kind = ?kind, nodes = document.len(), "parsed markup");
    Ok(Markup {
        document,
        kind,
        doctype: doctype.filter(|_| kind == MarkupKind::Document),
    })
}

/// Read markup from any reader
pub fn parse_reader<R: Read>(mut reader: R) -> Result<Markup> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .map_err(|e| Error::Parse(format!("Failed to read markup: {e}")))?;
    parse(&input)
}

fn detect_kind(input: &str) -> MarkupKind {
    let lowered = input.to_ascii_lowercase();
    if lowered.contains("<!doctype") || lowered.contains("<html") {
        MarkupKind::Document
    } else {
        MarkupKind::Fragment
    }
}

/// Copy `handle` and its subtree under `parent`
fn import(document: &mut Document, parent: NodeId, handle: &Handle) {
    let node = match &handle.data {
        DomData::Element { name, attrs, .. } => {
            let mut element = Element::new(name.local.to_string());
            for attribute in attrs.borrow().iter() {
                let key = match &attribute.name.prefix {
                    Some(prefix) => format!("{prefix}:{}", attribute.name.local),
                    None => attribute.name.local.to_string(),
                };
                element.set_attribute(&key, &attribute.value);
            }
            document.append_element(parent, element)
        }
        DomData::Text { contents } => {
            document.append_text(parent, &contents.borrow());
            return;
        }
        DomData::Comment { contents } => {
            let comment = document.create_comment(contents);
            document.append_child(parent, comment);
            return;
        }
        DomData::Document | DomData::Doctype { .. } | DomData::ProcessingInstruction { .. } => {
            return;
        }
    };

    for child in handle.children.borrow().iter() {
        import(document, node, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::NodeData;

    #[test]
    fn test_fragment() {
        let markup = parse("The <strong>quick</strong> brown").unwrap();
        let document = &markup.document;
        let root = document.root();

        assert_eq!(markup.kind, MarkupKind::Fragment);
        assert_eq!(document.child_count(root), 3);
        assert_eq!(document.text_content(root), "The quick brown");
        assert_eq!(document.elements_named(root, "strong").count(), 1);
    }

    #[test]
    fn test_attributes_and_comments() {
        let markup = parse(r#"<p class="lead" data-x="1">hi<!-- note --></p>"#).unwrap();
        let document = &markup.document;
        let p = document.elements_named(document.root(), "p").next().unwrap();

        assert_eq!(document.attribute(p, "class"), Some("lead"));
        assert_eq!(document.attribute(p, "data-x"), Some("1"));
        let last = document.last_child(p).unwrap();
        assert!(matches!(document.data(last), NodeData::Comment(c) if c == " note "));
    }

    #[test]
    fn test_full_document_keeps_structure() {
        let markup =
            parse("<!DOCTYPE html><html><head><title>T</title></head><body><p>x</p></body></html>")
                .unwrap();
        let document = &markup.document;
        let root = document.root();

        assert_eq!(markup.kind, MarkupKind::Document);
        assert_eq!(markup.doctype.as_deref(), Some("html"));
        assert_eq!(document.elements_named(root, "html").count(), 1);
        assert_eq!(document.elements_named(root, "title").count(), 1);
    }

    #[test]
    fn test_reader() {
        let markup = parse_reader("<em>a</em>".as_bytes()).unwrap();
        assert_eq!(markup.document.text_content(markup.document.root()), "a");
    }

    #[test]
    fn test_reader_failure_is_parse_error() {
        let invalid: &[u8] = &[0xff, 0xfe, 0x00];
        assert!(matches!(parse_reader(invalid), Err(Error::Parse(_))));
    }
}
