//! [`Document`] back to markup text
//!
//! The arena is mirrored into an `RcDom` and written out by html5ever's
//! serializer, which takes care of escaping and void elements.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::{ns, serialize, Attribute, LocalName, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData as DomData, SerializableHandle};

use crate::domain::tree::{Document, Element, MarkupTree, NodeData, NodeId};
use crate::error::{Error, Result};

/// Serialize the children of `node`
pub fn serialize_children(document: &Document, node: NodeId) -> Result<String> {
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    let mut output = Vec::new();
    for child in document.children(node) {
        let Some(handle) = mirror(document, child) else {
            continue;
        };
        serialize(&mut output, &SerializableHandle::from(handle), opts.clone())
            .map_err(|e| Error::Serialize(format!("HTML serialization failed: {e}")))?;
    }

    String::from_utf8(output)
        .map_err(|e| Error::Serialize(format!("UTF-8 conversion failed: {e}")))
}

/// Build the `RcDom` subtree for `node`
fn mirror(document: &Document, node: NodeId) -> Option<Handle> {
    let handle = match document.data(node) {
        NodeData::Element(element) => create_element(element),
        NodeData::Text(text) => create_leaf(DomData::Text {
            contents: RefCell::new(text.as_str().into()),
        }),
        NodeData::Comment(text) => create_leaf(DomData::Comment {
            contents: text.as_str().into(),
        }),
        NodeData::Fragment => return None,
    };

    for child in document.children(node) {
        if let Some(child_handle) = mirror(document, child) {
            child_handle.parent.set(Some(Rc::downgrade(&handle)));
            handle.children.borrow_mut().push(child_handle);
        }
    }
    Some(handle)
}

fn create_element(element: &Element) -> Handle {
    let attributes = element
        .attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name.as_str())),
            value: value.as_str().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: DomData::Element {
            name: QualName::new(None, ns!(html), LocalName::from(element.name.as_str())),
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

fn create_leaf(data: DomData) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data,
    })
}
