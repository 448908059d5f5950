//! Atomic tokens and the ordered stream they live in

use std::ops::Index;

/// One grapheme of the original text, held by its own text node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicToken<N> {
    /// Text node holding the grapheme
    pub node: N,
    /// The grapheme itself
    pub text: String,
    /// Position in the whole-document stream, 0-based and contiguous
    pub ordinal: usize,
}

/// Ordered token sequence
///
/// `next` / `previous` are the neighbouring ordinals; the links span text
/// leaves and elements alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStream<N> {
    tokens: Vec<AtomicToken<N>>,
}

impl<N> Default for TokenStream<N> {
    fn default() -> Self {
        Self { tokens: Vec::new() }
    }
}

impl<N: Copy + Eq> TokenStream<N> {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, ordinal: usize) -> Option<&AtomicToken<N>> {
        self.tokens.get(ordinal)
    }

    pub fn next(&self, token: &AtomicToken<N>) -> Option<&AtomicToken<N>> {
        self.tokens.get(token.ordinal + 1)
    }

    pub fn previous(&self, token: &AtomicToken<N>) -> Option<&AtomicToken<N>> {
        token
            .ordinal
            .checked_sub(1)
            .and_then(|ordinal| self.tokens.get(ordinal))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AtomicToken<N>> {
        self.tokens.iter()
    }

    /// Concatenated token text, i.e. the segmented text in document order
    pub fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Ordinal of the token held by `node`
    pub fn ordinal_of(&self, node: N) -> Option<usize> {
        self.tokens.iter().position(|t| t.node == node)
    }
}

impl<N> FromIterator<AtomicToken<N>> for TokenStream<N> {
    fn from_iter<I: IntoIterator<Item = AtomicToken<N>>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<N> Index<usize> for TokenStream<N> {
    type Output = AtomicToken<N>;

    fn index(&self, ordinal: usize) -> &Self::Output {
        &self.tokens[ordinal]
    }
}

impl<'a, N> IntoIterator for &'a TokenStream<N> {
    type Item = &'a AtomicToken<N>;
    type IntoIter = std::slice::Iter<'a, AtomicToken<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
