//! Per-run statistics

use std::ops::Range;
use std::time::Duration;

use serde::Serialize;

use crate::domain::assembler::Assembly;
use crate::domain::span::SpanKind;

/// Executed spans per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub sentence: usize,
    pub speaking: usize,
    pub word: usize,
    pub letter: usize,
}

impl KindCounts {
    pub fn get(&self, kind: SpanKind) -> usize {
        match kind {
            SpanKind::Sentence => self.sentence,
            SpanKind::Speaking => self.speaking,
            SpanKind::Word => self.word,
            SpanKind::Letter => self.letter,
        }
    }

    pub fn total(&self) -> usize {
        self.sentence + self.speaking + self.word + self.letter
    }
}

/// What one segmentation run did to its tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentReport {
    /// Atomic tokens produced by the tokenizer
    pub tokens: usize,
    /// Spans produced by every mode, duplicates included
    pub resolved_spans: usize,
    /// Spans that ended up as wrappers
    pub executed_spans: usize,
    /// Spans dropped because their tokens could not be wrapped
    pub skipped_spans: usize,
    /// Executed spans per kind
    pub kinds: KindCounts,
    /// Identifiers handed out, empty when identifiers are disabled
    pub identifiers: Option<Range<u64>>,
    /// Wall time of the run
    pub duration: Duration,
}

impl SegmentReport {
    pub(crate) fn from_assembly<N>(
        tokens: usize,
        resolved_spans: usize,
        assembly: &Assembly<N>,
        duration: Duration,
    ) -> Self {
        let kinds = KindCounts {
            sentence: assembly.count(SpanKind::Sentence),
            speaking: assembly.count(SpanKind::Speaking),
            word: assembly.count(SpanKind::Word),
            letter: assembly.count(SpanKind::Letter),
        };
        Self {
            tokens,
            resolved_spans,
            executed_spans: assembly.executed.len(),
            skipped_spans: assembly.skipped,
            kinds,
            identifiers: assembly.identifiers.clone(),
            duration,
        }
    }

    /// Empty report for a run that produced no tokens
    pub fn empty() -> Self {
        Self {
            tokens: 0,
            resolved_spans: 0,
            executed_spans: 0,
            skipped_spans: 0,
            kinds: KindCounts::default(),
            identifiers: None,
            duration: Duration::ZERO,
        }
    }

    /// Fold another run into this one
    pub fn merge(&mut self, other: &SegmentReport) {
        self.tokens += other.tokens;
        self.resolved_spans += other.resolved_spans;
        self.executed_spans += other.executed_spans;
        self.skipped_spans += other.skipped_spans;
        self.kinds.sentence += other.kinds.sentence;
        self.kinds.speaking += other.kinds.speaking;
        self.kinds.word += other.kinds.word;
        self.kinds.letter += other.kinds.letter;
        self.identifiers = match (self.identifiers.take(), other.identifiers.clone()) {
            (Some(a), Some(b)) => Some(a.start.min(b.start)..a.end.max(b.end)),
            (a, b) => a.or(b),
        };
        self.duration += other.duration;
    }
}
