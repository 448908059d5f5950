//! Identifier numbering shared across segmentation runs

use crate::domain::assembler::IdentifierCounter;

/// Owner of the identifier counter
///
/// One session numbers wrappers contiguously across every tree segmented
/// through it. Two sessions never share numbers.
#[derive(Debug, Clone, Default)]
pub struct TaggingSession {
    counter: IdentifierCounter,
    trees: usize,
}

impl TaggingSession {
    /// Session numbering from zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Session numbering from `first`
    pub fn starting_at(first: u64) -> Self {
        Self {
            counter: IdentifierCounter::starting_at(first),
            trees: 0,
        }
    }

    /// Identifier the next executed span will receive
    pub fn next_identifier(&self) -> u64 {
        self.counter.peek()
    }

    /// Number of trees segmented in this session
    pub fn trees_segmented(&self) -> usize {
        self.trees
    }

    pub(crate) fn counter_mut(&mut self) -> &mut IdentifierCounter {
        &mut self.counter
    }

    pub(crate) fn record_tree(&mut self) {
        self.trees += 1;
    }
}
