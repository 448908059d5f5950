//! Mutable ordered tree consumed by the segmentation pipeline
//!
//! The pipeline never talks to a concrete DOM. It works against
//! [`MarkupTree`], which exposes parent/child/sibling navigation, node-type
//! discrimination, element data for predicate matching and the handful of
//! mutations segmentation needs (create, insert, detach, set text).
//! [`Document`] is the arena implementation shipped with the crate and the
//! target of the markup parser.

use std::fmt;
use std::hash::Hash;

/// Node type discrimination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Container without markup of its own (the root of a parsed fragment)
    Fragment,
    /// Element with a tag name and attributes
    Element,
    /// Text leaf
    Text,
    /// Comment leaf, kept opaque
    Comment,
}

/// Read access to an element, as seen by selectors and custom matchers
pub trait ElementView {
    /// Tag name of the element
    fn local_name(&self) -> &str;

    /// Attribute value by name
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Check the whitespace separated `class` attribute for `class`
    fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Abstract mutable tree with element/text/fragment distinctions
pub trait MarkupTree {
    /// Node handle. Handles stay valid while nodes move around the tree.
    type Node: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self, node: Self::Node) -> NodeKind;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn first_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn last_child(&self, node: Self::Node) -> Option<Self::Node>;
    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;
    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// Text content of a text node, `None` for every other kind
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// Tag name of an element node, `None` for every other kind
    fn local_name(&self, node: Self::Node) -> Option<&str>;

    /// Attribute of an element node
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Create a detached element
    fn create_element(&mut self, name: &str) -> Self::Node;

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// Create a detached copy of an element node, attributes included and
    /// children left behind. `None` for every other kind.
    fn clone_element(&mut self, node: Self::Node) -> Option<Self::Node>;

    /// Set (or overwrite) an attribute on an element node
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Replace the content of a text node
    fn set_text(&mut self, node: Self::Node, text: &str);

    /// Move `child` under `parent`, right before `reference`, or at the end
    /// when `reference` is `None`. `child` is detached from its previous
    /// position first.
    fn insert_before(
        &mut self,
        parent: Self::Node,
        child: Self::Node,
        reference: Option<Self::Node>,
    );

    /// Unlink a node (and its subtree) from its parent
    fn detach(&mut self, node: Self::Node);

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) {
        self.insert_before(parent, child, None);
    }

    fn is_element(&self, node: Self::Node) -> bool {
        self.kind(node) == NodeKind::Element
    }

    fn is_text(&self, node: Self::Node) -> bool {
        self.kind(node) == NodeKind::Text
    }

    /// Borrow an element node as an [`ElementView`]
    fn element(&self, node: Self::Node) -> Option<ElementRef<'_, Self>> {
        self.is_element(node).then_some(ElementRef { tree: self, node })
    }

    /// Iterate over the direct children of `node`
    fn children(&self, node: Self::Node) -> Children<'_, Self> {
        Children {
            tree: self,
            next: self.first_child(node),
        }
    }

    fn child_count(&self, node: Self::Node) -> usize {
        self.children(node).count()
    }

    /// Check whether `node` is `ancestor` or lies below it
    fn is_inclusive_descendant(&self, node: Self::Node, ancestor: Self::Node) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

/// Element handle implementing [`ElementView`] for any tree
pub struct ElementRef<'a, T: MarkupTree + ?Sized> {
    tree: &'a T,
    node: T::Node,
}

impl<'a, T: MarkupTree + ?Sized> ElementRef<'a, T> {
    pub fn node(&self) -> T::Node {
        self.node
    }
}

impl<T: MarkupTree + ?Sized> ElementView for ElementRef<'_, T> {
    fn local_name(&self) -> &str {
        self.tree.local_name(self.node).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.tree.attribute(self.node, name)
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a, T: MarkupTree + ?Sized> {
    tree: &'a T,
    next: Option<T::Node>,
}

impl<T: MarkupTree + ?Sized> Iterator for Children<'_, T> {
    type Item = T::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Handle into a [`Document`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }
}

impl ElementView for Element {
    fn local_name(&self) -> &str {
        &self.name
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        Element::attribute(self, name)
    }
}

/// Node payload stored in the arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Fragment,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Slot {
    data: NodeData,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    previous_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Slot {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            previous_sibling: None,
            next_sibling: None,
        }
    }
}

/// Arena backed tree rooted at a fragment node
///
/// Nodes are never freed: detaching only unlinks them, so every [`NodeId`]
/// handed out stays valid for the lifetime of the document.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only its fragment root
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::new(NodeData::Fragment)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn data(&self, node: NodeId) -> &NodeData {
        &self.slots[node.0].data
    }

    /// Number of nodes ever allocated, attached or not
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first_child(self.root).is_none()
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()))
    }

    /// Create an element with attributes and append it to `parent`
    pub fn append_element(&mut self, parent: NodeId, element: Element) -> NodeId {
        let node = self.push(NodeData::Element(element));
        self.append_child(parent, node);
        node
    }

    /// Create a text node and append it to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(parent, node);
        node
    }

    /// Concatenated text of every text node below `node`
    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Pre-order iterator over `node` and everything below it
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            scope: node,
            next: Some(node),
        }
    }

    /// Element nodes below `node` (inclusive) with the given tag name
    pub fn elements_named<'a>(
        &'a self,
        node: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(node)
            .filter(move |n| matches!(self.data(*n), NodeData::Element(e) if e.name == name))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot::new(data));
        id
    }

    fn slot(&self, node: NodeId) -> &Slot {
        &self.slots[node.0]
    }

    fn slot_mut(&mut self, node: NodeId) -> &mut Slot {
        &mut self.slots[node.0]
    }
}

impl MarkupTree for Document {
    type Node = NodeId;

    fn kind(&self, node: NodeId) -> NodeKind {
        match self.slot(node).data {
            NodeData::Fragment => NodeKind::Fragment,
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Comment(_) => NodeKind::Comment,
        }
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).parent
    }

    fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).first_child
    }

    fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).last_child
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).next_sibling
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        self.slot(node).previous_sibling
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node).data {
            NodeData::Text(text) => Some(text),
            _ => None,
        }
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        match &self.slot(node).data {
            NodeData::Element(element) => Some(&element.name),
            _ => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.slot(node).data {
            NodeData::Element(element) => element.attribute(name),
            _ => None,
        }
    }

    fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(name)))
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    fn clone_element(&mut self, node: NodeId) -> Option<NodeId> {
        let element = match &self.slot(node).data {
            NodeData::Element(element) => element.clone(),
            _ => return None,
        };
        Some(self.push(NodeData::Element(element)))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let NodeData::Element(element) = &mut self.slot_mut(node).data {
            element.set_attribute(name, value);
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let NodeData::Text(existing) = &mut self.slot_mut(node).data {
            existing.clear();
            existing.push_str(text);
        }
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        debug_assert!(
            !self.is_inclusive_descendant(parent, child),
            "cannot insert a node below itself"
        );
        debug_assert!(reference.map_or(true, |r| self.parent(r) == Some(parent)));

        self.detach(child);
        self.slot_mut(child).parent = Some(parent);

        match reference {
            Some(reference) => {
                let previous = self.slot(reference).previous_sibling;
                self.slot_mut(child).previous_sibling = previous;
                self.slot_mut(child).next_sibling = Some(reference);
                self.slot_mut(reference).previous_sibling = Some(child);
                match previous {
                    Some(previous) => self.slot_mut(previous).next_sibling = Some(child),
                    None => self.slot_mut(parent).first_child = Some(child),
                }
            }
            None => {
                let last = self.slot(parent).last_child;
                self.slot_mut(child).previous_sibling = last;
                match last {
                    Some(last) => self.slot_mut(last).next_sibling = Some(child),
                    None => self.slot_mut(parent).first_child = Some(child),
                }
                self.slot_mut(parent).last_child = Some(child);
            }
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.slot(node).parent else {
            return;
        };
        let previous = self.slot(node).previous_sibling;
        let next = self.slot(node).next_sibling;

        match previous {
            Some(previous) => self.slot_mut(previous).next_sibling = next,
            None => self.slot_mut(parent).first_child = next,
        }
        match next {
            Some(next) => self.slot_mut(next).previous_sibling = previous,
            None => self.slot_mut(parent).last_child = previous,
        }

        let slot = self.slot_mut(node);
        slot.parent = None;
        slot.previous_sibling = None;
        slot.next_sibling = None;
    }
}

/// Pre-order walk bounded to one subtree
pub struct Descendants<'a> {
    document: &'a Document,
    scope: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = next_in_preorder(self.document, current, self.scope, true);
        Some(current)
    }
}

/// Following node in a pre-order walk of `scope`, optionally descending
/// into the children of `node`
pub(crate) fn next_in_preorder<T: MarkupTree + ?Sized>(
    tree: &T,
    node: T::Node,
    scope: T::Node,
    descend: bool,
) -> Option<T::Node> {
    if descend {
        if let Some(child) = tree.first_child(node) {
            return Some(child);
        }
    }
    let mut current = node;
    loop {
        if current == scope {
            return None;
        }
        if let Some(sibling) = tree.next_sibling(current) {
            return Some(sibling);
        }
        current = tree.parent(current)?;
    }
}
