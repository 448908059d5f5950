//! Splits the text leaves of a tree into atomic tokens
//!
//! The walk is pre-order and lazy: a text node is split into one text node
//! per grapheme only when the iterator reaches it. The first grapheme keeps
//! the original node, the others are inserted as its following siblings, so
//! document order is untouched.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::config::SegmentationConfig;
use crate::domain::classifier::{split_graphemes, CharacterClassifier};
use crate::domain::selector::ElementMatcher;
use crate::domain::token::{AtomicToken, TokenStream};
use crate::domain::tree::{next_in_preorder, MarkupTree, NodeKind};

/// Single-pass token iterator over a subtree
pub struct Tokens<'a, T: MarkupTree, C: CharacterClassifier> {
    tree: &'a mut T,
    root: T::Node,
    exclude: &'a ElementMatcher,
    classifier: &'a C,
    cursor: Option<T::Node>,
    pending: VecDeque<AtomicToken<T::Node>>,
    ordinal: usize,
}

impl<'a, T: MarkupTree, C: CharacterClassifier> Tokens<'a, T, C> {
    pub fn new(
        tree: &'a mut T,
        root: T::Node,
        exclude: &'a ElementMatcher,
        classifier: &'a C,
    ) -> Self {
        Self {
            tree,
            root,
            exclude,
            classifier,
            cursor: Some(root),
            pending: VecDeque::new(),
            ordinal: 0,
        }
    }

    fn is_excluded(&self, node: T::Node) -> bool {
        self.tree
            .element(node)
            .is_some_and(|element| self.exclude.matches(&element))
    }

    /// Split one text node in place and queue its tokens
    fn split(&mut self, node: T::Node) {
        let Some(text) = self.tree.text(node).map(str::to_owned) else {
            return;
        };
        if text.is_empty() || self.classifier.is_newline(&text) {
            trace!(len = text.len(), "skipping formatting-only text node");
            return;
        }
        let Some(parent) = self.tree.parent(node) else {
            trace!("skipping detached text node");
            return;
        };

        let mut graphemes = split_graphemes(&text);
        let Some(first) = graphemes.next() else {
            return;
        };
        self.tree.set_text(node, first);
        self.queue(node, first);

        let mut previous = node;
        for grapheme in graphemes {
            let token_node = self.tree.create_text(grapheme);
            let reference = self.tree.next_sibling(previous);
            self.tree.insert_before(parent, token_node, reference);
            self.queue(token_node, grapheme);
            previous = token_node;
        }
    }

    fn queue(&mut self, node: T::Node, text: &str) {
        self.pending.push_back(AtomicToken {
            node,
            text: text.to_string(),
            ordinal: self.ordinal,
        });
        self.ordinal += 1;
    }
}

impl<T: MarkupTree, C: CharacterClassifier> Iterator for Tokens<'_, T, C> {
    type Item = AtomicToken<T::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }

            let node = self.cursor?;
            match self.tree.kind(node) {
                NodeKind::Fragment => {
                    self.cursor = next_in_preorder(&*self.tree, node, self.root, true);
                }
                NodeKind::Element => {
                    let descend = !self.is_excluded(node);
                    self.cursor = next_in_preorder(&*self.tree, node, self.root, descend);
                }
                NodeKind::Text => {
                    // Computed before splitting so the new siblings are not revisited
                    self.cursor = next_in_preorder(&*self.tree, node, self.root, false);
                    if node != self.root {
                        self.split(node);
                    }
                }
                NodeKind::Comment => {
                    self.cursor = next_in_preorder(&*self.tree, node, self.root, false);
                }
            }
        }
    }
}

/// Tokenize every text leaf under `root` not covered by the exclude matcher
pub fn tokenize<T: MarkupTree>(
    tree: &mut T,
    root: T::Node,
    config: &SegmentationConfig,
) -> TokenStream<T::Node> {
    let stream: TokenStream<T::Node> =
        Tokens::new(tree, root, config.exclude(), config.classifier()).collect();
    debug!(tokens = stream.len(), "tokenized subtree");
    stream
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::{Document, Element, MarkupTree, NodeData};

    fn config() -> SegmentationConfig {
        SegmentationConfig::default()
    }

    #[test]
    fn test_plain_text_is_split_per_character() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "dog");

        let stream = tokenize(&mut doc, root, &config());

        assert_eq!(stream.len(), 3);
        assert_eq!(stream.text(), "dog");
        assert_eq!(doc.child_count(root), 3);
        let ordinals: Vec<_> = stream.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
        for token in &stream {
            assert_eq!(doc.text(token.node), Some(token.text.as_str()));
            assert_eq!(doc.parent(token.node), Some(root));
        }
    }

    #[test]
    fn test_diacritic_pair_is_one_token() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "a\u{0306}b");

        let stream = tokenize(&mut doc, root, &config());

        assert_eq!(stream.len(), 2);
        assert_eq!(stream[0].text, "a\u{0306}");
        assert_eq!(stream[0].text.chars().count(), 2);
        assert!(config().classifier().is_diacritic(&stream[0].text));
    }

    #[test]
    fn test_ordinals_span_elements() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "The ");
        let strong = doc.append_element(root, Element::new("strong"));
        doc.append_text(strong, "quick");
        doc.append_text(root, " brown");

        let stream = tokenize(&mut doc, root, &config());

        assert_eq!(stream.len(), 15);
        assert_eq!(stream.text(), "The quick brown");
        assert_eq!(doc.parent(stream[4].node), Some(strong));
        assert_eq!(doc.parent(stream[9].node), Some(root));
        assert_eq!(doc.child_count(strong), 5);
        assert_eq!(doc.text_content(root), "The quick brown");
    }

    #[test]
    fn test_excluded_subtrees_and_newlines_are_skipped() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "a");
        let script = doc.append_element(root, Element::new("script"));
        doc.append_text(script, "var x;");
        doc.append_text(root, "\n");
        let mut disabled = Element::new("span");
        disabled.set_attribute("class", "tagger--disable");
        let disabled = doc.append_element(root, disabled);
        doc.append_text(disabled, "skip");
        doc.append_text(root, "b");

        let stream = tokenize(&mut doc, root, &config());

        assert_eq!(stream.text(), "ab");
        assert_eq!(doc.text_content(script), "var x;");
        assert_eq!(doc.child_count(script), 1);
    }

    #[test]
    fn test_lazy_iterator_yields_in_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.append_element(root, Element::new("p"));
        doc.append_text(p, "hi");
        doc.append_text(root, "!");
        let exclude = ElementMatcher::none();
        let classifier = crate::domain::classifier::DefaultClassifier::default();

        let mut tokens = Tokens::new(&mut doc, root, &exclude, &classifier);
        assert_eq!(tokens.next().map(|t| t.text), Some("h".to_string()));
        assert_eq!(tokens.next().map(|t| t.text), Some("i".to_string()));
        assert_eq!(tokens.next().map(|t| (t.text, t.ordinal)), Some(("!".to_string(), 2)));
        assert!(tokens.next().is_none());
        assert!(tokens.next().is_none());
    }

    #[test]
    fn test_comments_survive() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        let comment = doc.create_comment(" note ");
        doc.append_child(root, comment);

        let stream = tokenize(&mut doc, root, &config());

        assert_eq!(stream.len(), 2);
        assert_eq!(doc.last_child(root), Some(comment));
        assert!(matches!(doc.data(comment), NodeData::Comment(c) if c == " note "));
    }
}
