//! Resolved spans and their ordering

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

/// Span kind, one per wrapper flavour
///
/// Space and punctuation spans are letter spans: they wrap one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Sentence,
    Speaking,
    Word,
    Letter,
}

impl SpanKind {
    pub const ALL: [SpanKind; 4] = [
        SpanKind::Sentence,
        SpanKind::Speaking,
        SpanKind::Word,
        SpanKind::Letter,
    ];

    /// Tie-break at equal start; lower executes (and is numbered) first
    pub fn precedence(self) -> u8 {
        match self {
            SpanKind::Sentence => 0,
            SpanKind::Speaking => 1,
            SpanKind::Word => 2,
            SpanKind::Letter => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpanKind::Sentence => "sentence",
            SpanKind::Speaking => "speaking",
            SpanKind::Word => "word",
            SpanKind::Letter => "letter",
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Range of token ordinals to wrap
///
/// `end == None` marks a single-token span wrapped in place; a span with
/// `end == Some(start)` still goes through the range path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: Option<usize>,
    pub kind: SpanKind,
}

impl Span {
    pub fn single(ordinal: usize, kind: SpanKind) -> Self {
        Self {
            start: ordinal,
            end: None,
            kind,
        }
    }

    pub fn range(start: usize, end: usize, kind: SpanKind) -> Self {
        debug_assert!(start <= end, "span end before start");
        Self {
            start,
            end: Some(end),
            kind,
        }
    }

    /// Last ordinal covered
    pub fn last(&self) -> usize {
        self.end.unwrap_or(self.start)
    }

    /// Number of tokens covered
    pub fn token_count(&self) -> usize {
        self.last() - self.start + 1
    }

    pub fn contains(&self, ordinal: usize) -> bool {
        (self.start..=self.last()).contains(&ordinal)
    }

    /// Execution order: start ordinal, then kind precedence
    pub fn sort_key(&self) -> (usize, u8) {
        (self.start, self.kind.precedence())
    }
}

impl PartialOrd for Span {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Span {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.end.cmp(&other.end))
    }
}
