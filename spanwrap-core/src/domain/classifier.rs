//! Character classification for segmentation boundaries
//!
//! Every predicate works on a grapheme string: one code point, or a base
//! code point followed by its combining marks. Classification looks at the
//! base code point; only [`CharacterClassifier::is_diacritic`] inspects the
//! marks.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use unicode_normalization::char::is_combining_mark;

/// Default sentence-terminal punctuation
pub const DEFAULT_STOP_PUNCTUATION: &[char] = &['.', '!', '?', ';', '·', '»'];

/// Default sentence-initial punctuation
pub const DEFAULT_START_PUNCTUATION: &[char] = &['«'];

/// Default apostrophes (ASCII and typographic)
pub const DEFAULT_APOSTROPHES: &[char] = &['\'', '’'];

/// Which code points count as letters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alphabet {
    /// Unicode alphabetic property
    #[default]
    Unicode,
    /// Unicode alphabetic or numeric
    UnicodeAlphanumeric,
    /// `a-z` and `A-Z` only
    Ascii,
}

impl Alphabet {
    pub fn contains(self, ch: char) -> bool {
        match self {
            Alphabet::Unicode => ch.is_alphabetic(),
            Alphabet::UnicodeAlphanumeric => ch.is_alphanumeric(),
            Alphabet::Ascii => ch.is_ascii_alphabetic(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Alphabet::Unicode => "unicode",
            Alphabet::UnicodeAlphanumeric => "unicode-alphanumeric",
            Alphabet::Ascii => "ascii",
        }
    }
}

/// Dominant class of a grapheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterClass {
    /// Newline or carriage return only
    Newline,
    /// Any other white space
    Whitespace,
    /// Member of the configured alphabet
    Letter,
    /// Sentence-terminal punctuation
    StopPunctuation,
    /// Sentence-initial punctuation
    StartPunctuation,
    /// Apostrophe
    Apostrophe,
    /// Any other non-letter, non-space character
    Punctuation,
    /// Empty input
    Empty,
}

/// Pure grapheme classification logic
pub trait CharacterClassifier: Send + Sync {
    /// Check whether the grapheme's base code point is in the alphabet
    fn is_alphabetic(&self, s: &str) -> bool;

    /// Check for sentence-terminal punctuation
    fn is_stop_punctuation(&self, s: &str) -> bool;

    /// Check for sentence-initial punctuation
    fn is_start_punctuation(&self, s: &str) -> bool;

    /// Check for an apostrophe
    fn is_apostrophe(&self, s: &str) -> bool;

    fn is_whitespace(&self, s: &str) -> bool {
        s.chars().next().is_some_and(char::is_whitespace)
    }

    /// True when `s` is made of newline / carriage return characters only
    fn is_newline(&self, s: &str) -> bool {
        !s.is_empty() && s.chars().all(|c| c == '\n' || c == '\r')
    }

    fn is_punctuation(&self, s: &str) -> bool {
        !s.is_empty() && !self.is_alphabetic(s) && !self.is_whitespace(s)
    }

    fn is_letter(&self, s: &str) -> bool {
        !s.is_empty() && !self.is_whitespace(s) && !self.is_punctuation(s)
    }

    /// A lone combining mark, or a base followed by one
    fn is_diacritic(&self, s: &str) -> bool {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(first), None) => is_combining_mark(first),
            (Some(_), Some(second)) => is_combining_mark(second),
            _ => false,
        }
    }

    fn classify(&self, s: &str) -> CharacterClass {
        if s.is_empty() {
            CharacterClass::Empty
        } else if self.is_newline(s) {
            CharacterClass::Newline
        } else if self.is_whitespace(s) {
            CharacterClass::Whitespace
        } else if self.is_stop_punctuation(s) {
            CharacterClass::StopPunctuation
        } else if self.is_start_punctuation(s) {
            CharacterClass::StartPunctuation
        } else if self.is_apostrophe(s) {
            CharacterClass::Apostrophe
        } else if self.is_punctuation(s) {
            CharacterClass::Punctuation
        } else {
            CharacterClass::Letter
        }
    }
}

/// Classifier settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub alphabet: Alphabet,
    pub stop_punctuation: SmallVec<[char; 8]>,
    pub start_punctuation: SmallVec<[char; 4]>,
    pub apostrophes: SmallVec<[char; 4]>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            alphabet: Alphabet::default(),
            stop_punctuation: DEFAULT_STOP_PUNCTUATION.iter().copied().collect(),
            start_punctuation: DEFAULT_START_PUNCTUATION.iter().copied().collect(),
            apostrophes: DEFAULT_APOSTROPHES.iter().copied().collect(),
        }
    }
}

/// Classifier driven by a [`ClassifierConfig`]
#[derive(Debug, Clone, Default)]
pub struct DefaultClassifier {
    config: ClassifierConfig,
}

impl DefaultClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn base_in(s: &str, set: &[char]) -> bool {
        s.chars().next().is_some_and(|c| set.contains(&c))
    }
}

impl CharacterClassifier for DefaultClassifier {
    fn is_alphabetic(&self, s: &str) -> bool {
        s.chars()
            .next()
            .is_some_and(|c| self.config.alphabet.contains(c))
    }

    fn is_stop_punctuation(&self, s: &str) -> bool {
        Self::base_in(s, &self.config.stop_punctuation)
    }

    fn is_start_punctuation(&self, s: &str) -> bool {
        Self::base_in(s, &self.config.start_punctuation)
    }

    fn is_apostrophe(&self, s: &str) -> bool {
        Self::base_in(s, &self.config.apostrophes)
    }
}

/// Split text into graphemes: each code point plus the combining marks that
/// directly follow it. A leading orphan mark forms its own grapheme.
pub fn split_graphemes(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut rest = text;
    std::iter::from_fn(move || {
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        let mut end = first.len_utf8();
        for (index, ch) in chars {
            if !is_combining_mark(ch) {
                break;
            }
            end = index + ch.len_utf8();
        }
        let (grapheme, tail) = rest.split_at(end);
        rest = tail;
        Some(grapheme)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DefaultClassifier {
        DefaultClassifier::default()
    }

    #[test]
    fn test_whitespace() {
        let c = classifier();
        assert!(c.is_whitespace(" "));
        assert!(c.is_whitespace("\n"));
        assert!(c.is_whitespace("\t"));
        assert!(!c.is_whitespace(""));
        assert!(!c.is_whitespace("a"));
        assert!(!c.is_whitespace("!"));
        assert!(!c.is_whitespace("a\u{0306}"));
    }

    #[test]
    fn test_newline_is_distinct_from_whitespace() {
        let c = classifier();
        assert!(c.is_newline("\n"));
        assert!(c.is_newline("\r\n"));
        assert!(!c.is_newline(" "));
        assert!(!c.is_newline("\n "));
        assert!(!c.is_newline(""));
    }

    #[test]
    fn test_punctuation_is_stable() {
        let c = classifier();
        for _ in 0..3 {
            assert!(c.is_punctuation("."));
        }
        assert!(c.is_punctuation(","));
        assert!(!c.is_punctuation("a"));
        assert!(!c.is_punctuation(" "));
        assert!(!c.is_punctuation(""));
        assert!(!c.is_whitespace("a"));
    }

    #[test]
    fn test_stop_and_start_punctuation() {
        let c = classifier();
        assert!(c.is_punctuation("!"));
        assert!(c.is_stop_punctuation("!"));
        assert!(c.is_stop_punctuation("·"));
        assert!(c.is_stop_punctuation("»"));
        assert!(!c.is_stop_punctuation(","));
        assert!(!c.is_stop_punctuation(" "));
        assert!(!c.is_stop_punctuation("a"));
        assert!(c.is_start_punctuation("«"));
        assert!(!c.is_start_punctuation("»"));
    }

    #[test]
    fn test_diacritics() {
        let c = classifier();
        assert!(c.is_diacritic("a\u{0306}"));
        assert!(c.is_diacritic("\u{0306}"));
        assert!(!c.is_diacritic("a"));
        assert!(!c.is_diacritic(","));
        assert!(!c.is_diacritic(" "));
        assert!(!c.is_diacritic(""));
    }

    #[test]
    fn test_letters_with_marks_are_letters() {
        let c = classifier();
        assert!(c.is_letter("a\u{0306}"));
        assert!(c.is_letter("ă"));
        assert!(c.is_letter("ж"));
        assert!(!c.is_letter("'"));
        assert_eq!(c.classify("a\u{0306}"), CharacterClass::Letter);
    }

    #[test]
    fn test_alphabet_choice() {
        let ascii = DefaultClassifier::new(ClassifierConfig {
            alphabet: Alphabet::Ascii,
            ..ClassifierConfig::default()
        });
        assert!(ascii.is_letter("a"));
        assert!(ascii.is_punctuation("ж"));

        let unicode = classifier();
        assert!(unicode.is_punctuation("7"));

        let alphanumeric = DefaultClassifier::new(ClassifierConfig {
            alphabet: Alphabet::UnicodeAlphanumeric,
            ..ClassifierConfig::default()
        });
        assert!(alphanumeric.is_letter("7"));
    }

    #[test]
    fn test_classify() {
        let c = classifier();
        assert_eq!(c.classify(""), CharacterClass::Empty);
        assert_eq!(c.classify("\n"), CharacterClass::Newline);
        assert_eq!(c.classify(" "), CharacterClass::Whitespace);
        assert_eq!(c.classify("?"), CharacterClass::StopPunctuation);
        assert_eq!(c.classify("«"), CharacterClass::StartPunctuation);
        assert_eq!(c.classify("’"), CharacterClass::Apostrophe);
        assert_eq!(c.classify(","), CharacterClass::Punctuation);
        assert_eq!(c.classify("x"), CharacterClass::Letter);
    }

    #[test]
    fn test_split_graphemes_attaches_marks() {
        let parts: Vec<_> = split_graphemes("a\u{0306}b").collect();
        assert_eq!(parts, vec!["a\u{0306}", "b"]);

        let parts: Vec<_> = split_graphemes("e\u{0301}\u{0323}!").collect();
        assert_eq!(parts, vec!["e\u{0301}\u{0323}", "!"]);

        let parts: Vec<_> = split_graphemes("\u{0306}a").collect();
        assert_eq!(parts, vec!["\u{0306}", "a"]);

        assert_eq!(split_graphemes("").count(), 0);
    }
}
