//! Boundary resolution: turns the token stream into spans, one pass per mode

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::config::{Mode, SegmentationConfig};
use crate::domain::classifier::{CharacterClass, CharacterClassifier};
use crate::domain::span::{Span, SpanKind};
use crate::domain::token::TokenStream;
use crate::domain::tree::MarkupTree;

type Chain<N> = SmallVec<[N; 16]>;

/// Per-invocation memo indexed by token ordinal
///
/// Character classes are computed up front; the last-in-block flag is
/// structural and filled lazily.
#[derive(Debug, Clone, Default)]
pub struct TokenFacts {
    classes: Vec<CharacterClass>,
    last_in_block: Vec<Option<bool>>,
}

impl TokenFacts {
    pub fn new<N, C>(stream: &TokenStream<N>, classifier: &C) -> Self
    where
        N: Copy + Eq,
        C: CharacterClassifier,
    {
        Self {
            classes: stream
                .iter()
                .map(|token| classifier.classify(&token.text))
                .collect(),
            last_in_block: vec![None; stream.len()],
        }
    }

    pub fn class(&self, ordinal: usize) -> CharacterClass {
        self.classes
            .get(ordinal)
            .copied()
            .unwrap_or(CharacterClass::Empty)
    }

    pub fn is_letter(&self, ordinal: usize) -> bool {
        self.class(ordinal) == CharacterClass::Letter
    }

    pub fn is_whitespace(&self, ordinal: usize) -> bool {
        matches!(
            self.class(ordinal),
            CharacterClass::Whitespace | CharacterClass::Newline
        )
    }

    pub fn is_newline(&self, ordinal: usize) -> bool {
        self.class(ordinal) == CharacterClass::Newline
    }

    pub fn is_punctuation(&self, ordinal: usize) -> bool {
        matches!(
            self.class(ordinal),
            CharacterClass::StopPunctuation
                | CharacterClass::StartPunctuation
                | CharacterClass::Apostrophe
                | CharacterClass::Punctuation
        )
    }

    pub fn is_stop_punctuation(&self, ordinal: usize) -> bool {
        self.class(ordinal) == CharacterClass::StopPunctuation
    }

    pub fn is_start_punctuation(&self, ordinal: usize) -> bool {
        self.class(ordinal) == CharacterClass::StartPunctuation
    }

    pub fn is_apostrophe(&self, ordinal: usize) -> bool {
        self.class(ordinal) == CharacterClass::Apostrophe
    }
}

/// Span resolver over one tokenized subtree
pub struct BoundaryResolver<'a, T: MarkupTree> {
    tree: &'a T,
    root: T::Node,
    stream: &'a TokenStream<T::Node>,
    config: &'a SegmentationConfig,
    facts: TokenFacts,
}

impl<'a, T: MarkupTree> BoundaryResolver<'a, T> {
    pub fn new(
        tree: &'a T,
        root: T::Node,
        stream: &'a TokenStream<T::Node>,
        config: &'a SegmentationConfig,
    ) -> Self {
        Self {
            tree,
            root,
            stream,
            config,
            facts: TokenFacts::new(stream, config.classifier()),
        }
    }

    pub fn facts(&self) -> &TokenFacts {
        &self.facts
    }

    /// Resolve spans for every enabled mode, concatenated in mode order
    pub fn resolve(&mut self) -> Vec<Span> {
        let mut spans = Vec::new();

        if self.config.has_mode(Mode::Sentence) {
            let before = spans.len();
            self.sentences(&mut spans);
            debug!(mode = "sentence", spans = spans.len() - before, "resolved");
        }
        if self.config.has_mode(Mode::Speaking) {
            let before = spans.len();
            self.speaking_units(&mut spans);
            debug!(mode = "speaking", spans = spans.len() - before, "resolved");
        }
        if self.config.has_mode(Mode::Word) {
            let before = spans.len();
            self.words(&mut spans);
            debug!(mode = "word", spans = spans.len() - before, "resolved");
        }

        let before = spans.len();
        if self.config.has_mode(Mode::Letter) {
            spans.extend((0..self.stream.len()).map(|o| Span::single(o, SpanKind::Letter)));
        } else {
            if self.config.has_mode(Mode::Space) {
                spans.extend(
                    (0..self.stream.len())
                        .filter(|&o| self.facts.is_whitespace(o))
                        .map(|o| Span::single(o, SpanKind::Letter)),
                );
            }
            if self.config.has_mode(Mode::Punctuation) {
                spans.extend(
                    (0..self.stream.len())
                        .filter(|&o| self.facts.is_punctuation(o))
                        .map(|o| Span::single(o, SpanKind::Letter)),
                );
            }
        }
        if spans.len() > before {
            debug!(mode = "letter", spans = spans.len() - before, "resolved");
        }

        spans
    }

    fn sentences(&mut self, spans: &mut Vec<Span>) {
        let count = self.stream.len();
        let mut start: Option<usize> = None;
        let mut index = 0;

        while index < count {
            if start.is_none() && !self.facts.is_newline(index) {
                start = Some(index);
            }
            let Some(first) = start else {
                index += 1;
                continue;
            };

            let next = index + 1;
            let closes = next >= count
                || self.facts.is_start_punctuation(next)
                || self.is_last_in_block(index)
                || (self.facts.is_stop_punctuation(index)
                    && !self.facts.is_punctuation(next)
                    && !self.facts.is_letter(next))
                || self.is_crossing_disallowed(first, next);
            if !closes {
                index += 1;
                continue;
            }

            let mut end = index;
            if !self.is_last_in_block(index) {
                while end + 1 < count && self.facts.is_stop_punctuation(end + 1) {
                    end += 1;
                }
            }

            if (first..=end).all(|o| self.facts.is_whitespace(o)) {
                trace!(start = first, end, "dropping whitespace-only sentence");
            } else {
                spans.push(Span::range(first, end, SpanKind::Sentence));
            }
            start = None;
            index = end + 1;
        }
    }

    fn speaking_units(&mut self, spans: &mut Vec<Span>) {
        let count = self.stream.len();
        let mut start: Option<usize> = None;

        for index in 0..count {
            if start.is_none() {
                if self.facts.is_letter(index) || self.facts.is_start_punctuation(index) {
                    start = Some(index);
                } else if self.facts.is_punctuation(index) {
                    spans.push(Span::single(index, SpanKind::Letter));
                }
            }
            let Some(first) = start else {
                continue;
            };

            let next = index + 1;
            let closes = next >= count
                || self.facts.is_whitespace(next)
                || self.is_last_in_block(index)
                || self.is_crossing_disallowed(first, next)
                || self.leaves_start_parent(first, next);
            if closes {
                spans.push(Span::range(first, index, SpanKind::Speaking));
                start = None;
            }
        }
    }

    fn words(&mut self, spans: &mut Vec<Span>) {
        let count = self.stream.len();
        let mut start: Option<usize> = None;

        for index in 0..count {
            if start.is_none() && self.facts.is_letter(index) {
                start = Some(index);
            }
            let Some(first) = start else {
                continue;
            };

            let next = index + 1;
            let closes = self.facts.is_apostrophe(index)
                || next >= count
                || (!self.facts.is_letter(next) && !self.facts.is_apostrophe(next))
                || self.is_last_in_block(index)
                || self.is_crossing_disallowed(first, next);
            if closes {
                for (s, e) in self.split_tail(first, index) {
                    spans.push(Span::range(s, e, SpanKind::Word));
                }
                start = None;
            }
        }
    }

    /// Whether the token closes its block: no next token, the next token
    /// lives in another block, or an explicit break (or excluded element)
    /// directly follows the token's trailing ancestors
    pub fn is_last_in_block(&mut self, ordinal: usize) -> bool {
        if let Some(Some(cached)) = self.facts.last_in_block.get(ordinal) {
            return *cached;
        }
        let value = self.compute_last_in_block(ordinal);
        if let Some(slot) = self.facts.last_in_block.get_mut(ordinal) {
            *slot = Some(value);
        }
        value
    }

    fn compute_last_in_block(&self, ordinal: usize) -> bool {
        let (Some(token), Some(next)) = (self.stream.get(ordinal), self.stream.get(ordinal + 1))
        else {
            return true;
        };

        let mut current = token.node;
        let mut trailing = true;
        loop {
            let sibling = self.tree.next_sibling(current);
            if trailing && sibling.is_some_and(|s| self.is_break(s)) {
                return true;
            }
            if self.is_block(current) || current == self.root {
                break;
            }
            trailing &= sibling.is_none();
            match self.tree.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        self.nearest_block(token.node) != self.nearest_block(next.node)
    }

    /// Whether extending the run from `start` up to `candidate` would move
    /// a node out from under an ancestor it shares with preceding content
    pub fn is_crossing_disallowed(&self, start: usize, candidate: usize) -> bool {
        let (Some(start), Some(candidate)) = (self.stream.get(start), self.stream.get(candidate))
        else {
            return false;
        };
        let start_chain = self.chain(start.node);
        let candidate_depth = self.chain(candidate.node).len();
        if start_chain.len() <= candidate_depth {
            return false;
        }
        start_chain[..start_chain.len() - candidate_depth]
            .iter()
            .any(|&node| self.tree.previous_sibling(node).is_some())
    }

    fn leaves_start_parent(&self, start: usize, next: usize) -> bool {
        let (Some(start), Some(next)) = (self.stream.get(start), self.stream.get(next)) else {
            return false;
        };
        let parent = self.tree.parent(next.node);
        parent != self.tree.parent(start.node)
            && parent.is_some_and(|p| self.tree.child_count(p) > 1)
    }

    /// Split a word whose last token sits inside an element that continues
    /// past it, at that element's first token, until no piece does
    fn split_tail(&self, start: usize, end: usize) -> SmallVec<[(usize, usize); 2]> {
        let mut pieces = SmallVec::new();
        let mut pending: SmallVec<[(usize, usize); 4]> = SmallVec::new();
        pending.push((start, end));

        while let Some((first, last)) = pending.pop() {
            match self.tail_split_point(first, last) {
                Some(point) => {
                    trace!(start = first, end = last, point, "splitting word tail");
                    pending.push((point, last));
                    pending.push((first, point - 1));
                }
                None => pieces.push((first, last)),
            }
        }
        pieces
    }

    fn tail_split_point(&self, first: usize, last: usize) -> Option<usize> {
        if first == last {
            return None;
        }
        let start = self.stream.get(first)?.node;
        let end = self.stream.get(last)?.node;
        let after = self.stream.get(last + 1)?.node;

        let mut current = self.tree.parent(end)?;
        while current != self.root && !self.tree.is_inclusive_descendant(start, current) {
            if self.tree.is_inclusive_descendant(after, current) {
                let mut point = last;
                while point > first + 1
                    && self
                        .stream
                        .get(point - 1)
                        .is_some_and(|t| self.tree.is_inclusive_descendant(t.node, current))
                {
                    point -= 1;
                }
                return Some(point);
            }
            current = self.tree.parent(current)?;
        }
        None
    }

    /// Node and its ancestors up to the root, deepest first
    fn chain(&self, node: T::Node) -> Chain<T::Node> {
        let mut chain = Chain::new();
        let mut current = Some(node);
        while let Some(n) = current {
            chain.push(n);
            if n == self.root {
                break;
            }
            current = self.tree.parent(n);
        }
        chain
    }

    fn nearest_block(&self, node: T::Node) -> Option<T::Node> {
        let mut current = self.tree.parent(node);
        while let Some(n) = current {
            if self.is_block(n) {
                return Some(n);
            }
            if n == self.root {
                return None;
            }
            current = self.tree.parent(n);
        }
        None
    }

    fn is_block(&self, node: T::Node) -> bool {
        self.tree
            .element(node)
            .is_some_and(|e| self.config.block().matches(&e))
    }

    fn is_break(&self, node: T::Node) -> bool {
        self.tree.element(node).is_some_and(|e| {
            self.config.line_break().matches(&e) || self.config.exclude().matches(&e)
        })
    }
}

/// Resolve spans for `stream` under `root`
pub fn resolve<T: MarkupTree>(
    tree: &T,
    root: T::Node,
    stream: &TokenStream<T::Node>,
    config: &SegmentationConfig,
) -> Vec<Span> {
    BoundaryResolver::new(tree, root, stream, config).resolve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tokenizer::tokenize;
    use crate::domain::tree::{Document, Element, NodeId};

    fn config(modes: &[&str]) -> SegmentationConfig {
        SegmentationConfig::builder()
            .mode_names(modes)
            .unwrap()
            .build()
            .unwrap()
    }

    fn text_of(stream: &TokenStream<NodeId>, span: &Span) -> String {
        (span.start..=span.last())
            .map(|o| stream[o].text.as_str())
            .collect()
    }

    fn resolve_plain(text: &str, modes: &[&str]) -> Vec<String> {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, text);
        let config = config(modes);
        let stream = tokenize(&mut doc, root, &config);
        resolve(&doc, root, &stream, &config)
            .iter()
            .map(|span| text_of(&stream, span))
            .collect()
    }

    #[test]
    fn test_words() {
        assert_eq!(
            resolve_plain("The quick brown fox", &["word"]),
            vec!["The", "quick", "brown", "fox"]
        );
    }

    #[test]
    fn test_words_split_after_apostrophe() {
        assert_eq!(
            resolve_plain("l'amico dell’uomo", &["word"]),
            vec!["l'", "amico", "dell’", "uomo"]
        );
    }

    #[test]
    fn test_words_skip_punctuation_and_digits() {
        assert_eq!(
            resolve_plain("Hi, 42 cats.", &["word"]),
            vec!["Hi", "cats"]
        );
    }

    #[test]
    fn test_sentence_absorbs_stop_punctuation() {
        assert_eq!(
            resolve_plain("Wait!! Really?", &["sentence"]),
            vec!["Wait!!", " Really?"]
        );
    }

    #[test]
    fn test_sentence_closes_before_start_punctuation() {
        assert_eq!(
            resolve_plain("He said «go» now", &["sentence"]),
            vec!["He said ", "«go»", " now"]
        );
    }

    #[test]
    fn test_whitespace_only_sentence_dropped() {
        assert_eq!(
            resolve_plain("Done. ", &["sentence"]),
            vec!["Done."]
        );
    }

    #[test]
    fn test_speaking_units() {
        assert_eq!(
            resolve_plain("Hello, world! ok", &["speaking"]),
            vec!["Hello,", "world!", "ok"]
        );
    }

    #[test]
    fn test_speaking_isolated_punctuation() {
        let spans = {
            let mut doc = Document::new();
            let root = doc.root();
            doc.append_text(root, "- go");
            let config = config(&["speaking"]);
            let stream = tokenize(&mut doc, root, &config);
            resolve(&doc, root, &stream, &config)
        };
        assert_eq!(spans[0], Span::single(0, SpanKind::Letter));
        assert_eq!(spans[1], Span::range(2, 3, SpanKind::Speaking));
    }

    #[test]
    fn test_space_and_punctuation_modes() {
        assert_eq!(resolve_plain("a b, c", &["space"]), vec![" ", " "]);
        assert_eq!(resolve_plain("a b, c", &["punctuation"]), vec![","]);
        // letter mode wins over both
        assert_eq!(resolve_plain("a b", &["letter", "space"]).len(), 3);
    }

    #[test]
    fn test_block_boundary_closes_sentence_and_word() {
        let mut doc = Document::new();
        let root = doc.root();
        let first = doc.append_element(root, Element::new("p"));
        doc.append_text(first, "one");
        let second = doc.append_element(root, Element::new("p"));
        doc.append_text(second, "two");
        let config = config(&["sentence", "word"]);
        let stream = tokenize(&mut doc, root, &config);

        let mut resolver = BoundaryResolver::new(&doc, root, &stream, &config);
        assert!(resolver.is_last_in_block(2));
        assert!(!resolver.is_last_in_block(1));
        assert!(resolver.is_last_in_block(5));

        let texts: Vec<_> = resolver
            .resolve()
            .iter()
            .map(|span| (span.kind, text_of(&stream, span)))
            .collect();
        assert_eq!(
            texts,
            vec![
                (SpanKind::Sentence, "one".to_string()),
                (SpanKind::Sentence, "two".to_string()),
                (SpanKind::Word, "one".to_string()),
                (SpanKind::Word, "two".to_string()),
            ]
        );
    }

    #[test]
    fn test_entering_block_is_a_boundary() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        let div = doc.append_element(root, Element::new("div"));
        doc.append_text(div, "cd");

        assert_eq!(
            {
                let config = config(&["word"]);
                let stream = tokenize(&mut doc, root, &config);
                resolve(&doc, root, &stream, &config)
                    .iter()
                    .map(|s| text_of(&stream, s))
                    .collect::<Vec<_>>()
            },
            vec!["ab", "cd"]
        );
    }

    #[test]
    fn test_line_break_is_a_boundary() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        doc.append_element(root, Element::new("br"));
        doc.append_text(root, "cd");
        let config = config(&["word"]);
        let stream = tokenize(&mut doc, root, &config);

        let spans = resolve(&doc, root, &stream, &config);
        assert_eq!(
            spans,
            vec![
                Span::range(0, 1, SpanKind::Word),
                Span::range(2, 3, SpanKind::Word)
            ]
        );
    }

    #[test]
    fn test_crossing_out_of_element_with_preceding_content() {
        let mut doc = Document::new();
        let root = doc.root();
        let bold = doc.append_element(root, Element::new("b"));
        doc.append_text(bold, "xy ab");
        doc.append_text(root, "cd");
        let config = config(&["word"]);
        let stream = tokenize(&mut doc, root, &config);

        let resolver = BoundaryResolver::new(&doc, root, &stream, &config);
        assert!(resolver.is_crossing_disallowed(3, 5));
        assert!(!resolver.is_crossing_disallowed(0, 5));
        assert!(!resolver.is_crossing_disallowed(5, 6));

        let texts: Vec<_> = resolve(&doc, root, &stream, &config)
            .iter()
            .map(|s| text_of(&stream, s))
            .collect();
        assert_eq!(texts, vec!["xy", "ab", "cd"]);
    }

    #[test]
    fn test_word_tail_split_at_continuing_element() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        let bold = doc.append_element(root, Element::new("b"));
        doc.append_text(bold, "cd xy");
        let config = config(&["word"]);
        let stream = tokenize(&mut doc, root, &config);

        let texts: Vec<_> = resolve(&doc, root, &stream, &config)
            .iter()
            .map(|s| text_of(&stream, s))
            .collect();
        assert_eq!(texts, vec!["ab", "cd", "xy"]);
    }

    #[test]
    fn test_word_spanning_whole_element_is_kept() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        let bold = doc.append_element(root, Element::new("b"));
        doc.append_text(bold, "cd");
        doc.append_text(root, "ef gh");
        let config = config(&["word"]);
        let stream = tokenize(&mut doc, root, &config);

        let texts: Vec<_> = resolve(&doc, root, &stream, &config)
            .iter()
            .map(|s| text_of(&stream, s))
            .collect();
        assert_eq!(texts, vec!["abcdef", "gh"]);
    }

    #[test]
    fn test_speaking_stops_at_inline_element() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "ab");
        let em = doc.append_element(root, Element::new("em"));
        doc.append_text(em, "cd");
        doc.append_text(root, "ef");
        let config = config(&["speaking"]);
        let stream = tokenize(&mut doc, root, &config);

        let texts: Vec<_> = resolve(&doc, root, &stream, &config)
            .iter()
            .map(|s| text_of(&stream, s))
            .collect();
        assert_eq!(texts, vec!["ab", "cd", "ef"]);
    }

    #[test]
    fn test_facts() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_text(root, "a. '\n«");
        let config = config(&["letter"]);
        let stream = tokenize(&mut doc, root, &config);
        let facts = TokenFacts::new(&stream, config.classifier());

        assert!(facts.is_letter(0));
        assert!(facts.is_stop_punctuation(1));
        assert!(facts.is_punctuation(1));
        assert!(facts.is_whitespace(2));
        assert!(facts.is_apostrophe(3));
        assert!(facts.is_newline(4));
        assert!(facts.is_whitespace(4));
        assert!(facts.is_start_punctuation(5));
        assert_eq!(facts.class(99), CharacterClass::Empty);
    }
}
