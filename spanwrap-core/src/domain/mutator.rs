//! Wrapper insertion
//!
//! A span is executed by creating one wrapper element and moving the nodes
//! it covers under it. Tokens are only re-parented, never removed, so the
//! text content and document order of the tree stay intact. An inline
//! element that holds the end of a span and also later tokens is split in
//! two first, so the wrapper never takes content past the span's end.

use std::collections::HashSet;

use smallvec::SmallVec;
use tracing::trace;

use crate::domain::selector::ElementMatcher;
use crate::domain::span::Span;
use crate::domain::token::TokenStream;
use crate::domain::tree::MarkupTree;

type Chain<N> = SmallVec<[N; 16]>;

/// Executes spans against one root, remembering the wrappers it created
pub struct TreeMutator<'a, T: MarkupTree> {
    root: T::Node,
    wrapper_tag: &'a str,
    block: &'a ElementMatcher,
    created: HashSet<T::Node>,
}

impl<'a, T: MarkupTree> TreeMutator<'a, T> {
    pub fn new(root: T::Node, wrapper_tag: &'a str, block: &'a ElementMatcher) -> Self {
        Self {
            root,
            wrapper_tag,
            block,
            created: HashSet::new(),
        }
    }

    /// Wrappers created so far
    pub fn wrappers(&self) -> &HashSet<T::Node> {
        &self.created
    }

    /// Wrap the tokens of `span`, returning the new wrapper
    ///
    /// Returns `None` when an endpoint is no longer attached under the root
    /// or the endpoints share no ancestor; the tree is left untouched.
    pub fn wrap(
        &mut self,
        tree: &mut T,
        span: &Span,
        stream: &TokenStream<T::Node>,
    ) -> Option<T::Node> {
        let start = stream.get(span.start)?.node;
        let end = match span.end {
            Some(ordinal) => Some(stream.get(ordinal)?.node),
            None => None,
        };
        if let (Some(end), Some(after)) = (end, span.end.and_then(|o| stream.get(o + 1))) {
            self.split_continuing(tree, start, end, after.node);
        }

        let (parent, first, last) = match end {
            None => {
                if !tree.is_inclusive_descendant(start, self.root) {
                    trace!(start = span.start, "token detached, skipping");
                    return None;
                }
                (tree.parent(start)?, start, start)
            }
            Some(end) => self.sibling_range(tree, start, end)?,
        };

        let range = Self::collect_range(tree, first, last);
        let wrapper = tree.create_element(self.wrapper_tag);
        tree.insert_before(parent, wrapper, Some(first));
        for node in range {
            tree.append_child(wrapper, node);
        }
        self.created.insert(wrapper);
        Some(wrapper)
    }

    /// Parent and bounding children of the run between two tokens, lifted
    /// over inline elements the run fully covers
    fn sibling_range(
        &self,
        tree: &T,
        start: T::Node,
        end: T::Node,
    ) -> Option<(T::Node, T::Node, T::Node)> {
        let start_chain = self.chain(tree, start)?;
        let end_chain = self.chain(tree, end)?;

        let (mut lca, mut first, mut last) = if start == end {
            (tree.parent(start)?, start, end)
        } else {
            let lca = *end_chain.iter().find(|node| start_chain.contains(node))?;
            let first = Self::child_of(&start_chain, lca)?;
            let last = Self::child_of(&end_chain, lca)?;
            (lca, first, last)
        };

        while lca != self.root
            && tree.first_child(lca) == Some(first)
            && tree.last_child(lca) == Some(last)
            && self.is_liftable(tree, lca)
        {
            first = lca;
            last = lca;
            lca = tree.parent(lca)?;
        }

        Some((lca, first, last))
    }

    /// Split every inline ancestor of `end` that lies below the span's LCA
    /// and also holds `after`, moving the content past `end` into a copy of
    /// the ancestor inserted right after it
    fn split_continuing(&self, tree: &mut T, start: T::Node, end: T::Node, after: T::Node) {
        if !tree.is_inclusive_descendant(start, self.root)
            || !tree.is_inclusive_descendant(end, self.root)
        {
            return;
        }

        let mut current = end;
        while let Some(ancestor) = tree.parent(current) {
            if ancestor == self.root || tree.is_inclusive_descendant(start, ancestor) {
                break;
            }
            if tree.is_inclusive_descendant(after, ancestor) {
                if !self.is_liftable(tree, ancestor) {
                    break;
                }
                let Some(outer) = tree.parent(ancestor) else {
                    break;
                };
                let Some(copy) = tree.clone_element(ancestor) else {
                    break;
                };
                trace!(?ancestor, ?copy, "splitting element at span end");
                let reference = tree.next_sibling(ancestor);
                tree.insert_before(outer, copy, reference);
                let mut next = tree.next_sibling(current);
                while let Some(node) = next {
                    next = tree.next_sibling(node);
                    tree.append_child(copy, node);
                }
            }
            current = ancestor;
        }
    }

    fn is_liftable(&self, tree: &T, node: T::Node) -> bool {
        !self.created.contains(&node)
            && tree
                .element(node)
                .is_some_and(|element| !self.block.matches(&element))
    }

    /// Root-terminated ancestor chain, deepest first; `None` when `node` is
    /// not under the root
    fn chain(&self, tree: &T, node: T::Node) -> Option<Chain<T::Node>> {
        let mut chain = Chain::new();
        let mut current = node;
        loop {
            chain.push(current);
            if current == self.root {
                return Some(chain);
            }
            current = tree.parent(current)?;
        }
    }

    /// Entry of `chain` directly below `ancestor`
    fn child_of(chain: &[T::Node], ancestor: T::Node) -> Option<T::Node> {
        let position = chain.iter().position(|&node| node == ancestor)?;
        position.checked_sub(1).map(|index| chain[index])
    }

    fn collect_range(tree: &T, first: T::Node, last: T::Node) -> SmallVec<[T::Node; 8]> {
        let mut range = SmallVec::new();
        let mut current = Some(first);
        while let Some(node) = current {
            range.push(node);
            if node == last {
                break;
            }
            current = tree.next_sibling(node);
        }
        range
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SegmentationConfig;
    use crate::domain::span::SpanKind;
    use crate::domain::tokenizer::tokenize;
    use crate::domain::tree::{Document, Element, NodeId};

    fn prepare(doc: &mut Document) -> TokenStream<NodeId> {
        let root = doc.root();
        tokenize(doc, root, &SegmentationConfig::default())
    }

    fn child_names(doc: &Document, node: NodeId) -> Vec<String> {
        doc.children(node)
            .map(|child| match doc.local_name(child) {
                Some(name) => format!("<{name}>"),
                None => doc.text(child).unwrap_or_default().to_string(),
            })
            .collect()
    }

    #[test]
    fn test_single_token_wrapped_in_place() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        let stream = prepare(&mut doc);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "t:span", &block);

        let wrapper = mutator
            .wrap(&mut doc, &Span::single(1, SpanKind::Letter), &stream)
            .unwrap();

        assert_eq!(child_names(&doc, root), vec!["a", "<t:span>"]);
        assert_eq!(doc.first_child(wrapper), Some(stream[1].node));
        assert!(mutator.wrappers().contains(&wrapper));
    }

    #[test]
    fn test_range_keeps_inline_markup_inside_wrapper() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "The ");
        let strong = doc.append_element(root, Element::new("strong"));
        doc.append_text(strong, "quick");
        doc.append_text(root, " brown");
        let stream = prepare(&mut doc);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "t:span", &block);

        let wrapper = mutator
            .wrap(&mut doc, &Span::range(4, 8, SpanKind::Word), &stream)
            .unwrap();

        assert_eq!(doc.parent(wrapper), Some(root));
        assert_eq!(doc.parent(strong), Some(wrapper));
        assert_eq!(doc.child_count(wrapper), 1);
        assert_eq!(doc.child_count(strong), 5);
        assert_eq!(doc.text_content(root), "The quick brown");
    }

    #[test]
    fn test_range_moves_whole_inline_subtrees() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        let em = doc.append_element(root, Element::new("em"));
        doc.append_text(em, "cd");
        doc.append_text(root, "ef");
        let stream = prepare(&mut doc);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "w", &block);

        let wrapper = mutator
            .wrap(&mut doc, &Span::range(1, 4, SpanKind::Word), &stream)
            .unwrap();

        assert_eq!(child_names(&doc, root), vec!["a", "<w>", "f"]);
        assert_eq!(child_names(&doc, wrapper), vec!["b", "<em>", "e"]);
        assert_eq!(doc.parent(em), Some(wrapper));
    }

    #[test]
    fn test_element_continuing_past_end_is_split() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "a");
        let mut b = Element::new("b");
        b.set_attribute("class", "x");
        let b = doc.append_element(root, b);
        doc.append_text(b, "b. c");
        let stream = prepare(&mut doc);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "w", &block);

        let wrapper = mutator
            .wrap(&mut doc, &Span::range(0, 2, SpanKind::Sentence), &stream)
            .unwrap();

        assert_eq!(child_names(&doc, root), vec!["<w>", "<b>"]);
        assert_eq!(child_names(&doc, wrapper), vec!["a", "<b>"]);
        assert_eq!(doc.text_content(wrapper), "ab.");
        assert_eq!(child_names(&doc, b), vec!["b", "."]);

        let rest = doc.last_child(root).unwrap();
        assert_ne!(rest, b);
        assert_eq!(doc.attribute(rest, "class"), Some("x"));
        assert_eq!(child_names(&doc, rest), vec![" ", "c"]);
        assert_eq!(doc.text_content(root), "ab. c");
    }

    #[test]
    fn test_element_holding_start_is_not_split() {
        let mut doc = Document::new();
        let root = doc.root();
        let em = doc.append_element(root, Element::new("em"));
        doc.append_text(em, "ab c");
        let stream = prepare(&mut doc);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "w", &block);

        let wrapper = mutator
            .wrap(&mut doc, &Span::range(0, 1, SpanKind::Word), &stream)
            .unwrap();

        assert_eq!(doc.parent(wrapper), Some(em));
        assert_eq!(child_names(&doc, root), vec!["<em>"]);
        assert_eq!(child_names(&doc, em), vec!["<w>", " ", "c"]);
    }

    #[test]
    fn test_block_lca_is_not_lifted() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, Element::new("p"));
        doc.append_text(p, "hey");
        let stream = prepare(&mut doc);
        let config = SegmentationConfig::default();
        let mut mutator = TreeMutator::new(root, "t:span", config.block());

        let wrapper = mutator
            .wrap(&mut doc, &Span::range(0, 2, SpanKind::Sentence), &stream)
            .unwrap();

        assert_eq!(doc.parent(wrapper), Some(p));
        assert_eq!(doc.child_count(p), 1);
    }

    #[test]
    fn test_own_wrappers_are_not_lifted() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "hi");
        let stream = prepare(&mut doc);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "t:span", &block);

        let outer = mutator
            .wrap(&mut doc, &Span::range(0, 1, SpanKind::Sentence), &stream)
            .unwrap();
        let inner = mutator
            .wrap(&mut doc, &Span::range(0, 1, SpanKind::Word), &stream)
            .unwrap();

        assert_eq!(doc.parent(inner), Some(outer));
        assert_eq!(doc.parent(stream[0].node), Some(inner));
    }

    #[test]
    fn test_single_token_range() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "a b");
        let stream = prepare(&mut doc);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "t:span", &block);

        let wrapper = mutator
            .wrap(&mut doc, &Span::range(2, 2, SpanKind::Word), &stream)
            .unwrap();

        assert_eq!(doc.parent(wrapper), Some(root));
        assert_eq!(child_names(&doc, wrapper), vec!["b"]);
    }

    #[test]
    fn test_detached_tokens_are_skipped() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, Element::new("p"));
        doc.append_text(p, "ab");
        let stream = prepare(&mut doc);
        doc.detach(p);
        let block = ElementMatcher::none();
        let mut mutator = TreeMutator::new(root, "t:span", &block);

        assert!(mutator
            .wrap(&mut doc, &Span::range(0, 1, SpanKind::Word), &stream)
            .is_none());
        assert!(mutator
            .wrap(&mut doc, &Span::single(0, SpanKind::Letter), &stream)
            .is_none());
        assert!(mutator.wrappers().is_empty());
        assert_eq!(doc.child_count(p), 2);
    }
}
