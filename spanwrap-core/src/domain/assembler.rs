//! Span ordering and execution
//!
//! Spans from every mode are deduplicated, sorted by start ordinal and kind
//! precedence, then executed one by one. Identifiers follow execution order,
//! so outer spans starting at the same token get the lower number.

use std::ops::Range;

use tracing::{debug, trace};

use crate::config::{Labels, SegmentationConfig};
use crate::domain::classifier::CharacterClassifier;
use crate::domain::mutator::TreeMutator;
use crate::domain::span::{Span, SpanKind};
use crate::domain::token::TokenStream;
use crate::domain::tree::MarkupTree;

/// Monotonic identifier source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdentifierCounter {
    next: u64,
}

impl IdentifierCounter {
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Identifier the next executed span will receive
    pub fn peek(&self) -> u64 {
        self.next
    }

    pub fn issue(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// One span that made it into the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedSpan<N> {
    pub span: Span,
    pub wrapper: N,
    pub identifier: Option<u64>,
}

/// Outcome of one assembly pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly<N> {
    pub executed: Vec<ExecutedSpan<N>>,
    pub skipped: usize,
    pub identifiers: Option<Range<u64>>,
}

impl<N> Assembly<N> {
    pub fn count(&self, kind: SpanKind) -> usize {
        self.executed.iter().filter(|e| e.span.kind == kind).count()
    }
}

/// Order and execute spans against `root`
pub fn assemble<T: MarkupTree>(
    tree: &mut T,
    root: T::Node,
    mut spans: Vec<Span>,
    stream: &TokenStream<T::Node>,
    config: &SegmentationConfig,
    counter: &mut IdentifierCounter,
) -> Assembly<T::Node> {
    let resolved = spans.len();
    spans.sort();
    spans.dedup();
    if spans.len() < resolved {
        debug!(duplicates = resolved - spans.len(), "merged duplicate spans");
    }

    let first_identifier = counter.peek();
    let mut mutator = TreeMutator::new(root, config.wrapper_tag(), config.block());
    let mut executed = Vec::with_capacity(spans.len());
    let mut skipped = 0;

    for span in spans {
        let Some(wrapper) = mutator.wrap(tree, &span, stream) else {
            trace!(start = span.start, end = ?span.end, kind = %span.kind, "span skipped");
            skipped += 1;
            continue;
        };

        let identifier = config.assign_identifiers().then(|| counter.issue());
        if let Some(id) = identifier {
            tree.set_attribute(wrapper, config.identifier_attribute(), &id.to_string());
        }
        if config.use_labels() {
            let text = stream.get(span.start).map(|t| t.text.as_str()).unwrap_or_default();
            tree.set_attribute(wrapper, "class", &label_for(&span, text, config));
        }

        executed.push(ExecutedSpan {
            span,
            wrapper,
            identifier,
        });
    }

    let identifiers = (counter.peek() > first_identifier).then(|| first_identifier..counter.peek());
    debug!(executed = executed.len(), skipped, "assembled spans");

    Assembly {
        executed,
        skipped,
        identifiers,
    }
}

/// Class attribute value for a wrapper
fn label_for(span: &Span, text: &str, config: &SegmentationConfig) -> String {
    let labels: &Labels = config.labels();
    let mut parts: Vec<&str> = vec![labels.token.as_str()];

    match span.kind {
        SpanKind::Sentence => parts.push(&labels.sentence),
        SpanKind::Speaking => parts.push(&labels.speaking),
        SpanKind::Word => parts.push(&labels.word),
        SpanKind::Letter => {
            let classifier = config.classifier();
            parts.push(labels.letter.as_str());
            if classifier.is_punctuation(text) {
                parts.push(labels.punctuation.as_str());
                if classifier.is_stop_punctuation(text) {
                    parts.push(labels.sentence_stop.as_str());
                }
            }
            if classifier.is_whitespace(text) {
                parts.push(labels.whitespace.as_str());
            }
        }
    }

    parts.retain(|part| !part.is_empty());
    parts.join(" ")
}
