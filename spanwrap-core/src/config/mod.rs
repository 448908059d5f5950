//! Segmentation configuration
//!
//! [`SegmentationConfig`] is the immutable snapshot every pipeline stage
//! reads. It is built (and validated) through [`ConfigBuilder`] or loaded
//! from a TOML file through [`ConfigFile`]; all selector parsing happens at
//! build time so a bad matcher fails before any tree is touched.

mod file;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::domain::classifier::{Alphabet, ClassifierConfig, DefaultClassifier};
use crate::domain::selector::ElementMatcher;
use crate::error::{Error, Result};

pub use file::{
    ClassifierSection, ConfigFile, LabelSection, SegmentationSection, SelectorSection,
};

/// Default configuration constants
pub mod defaults {
    /// Element name used for every wrapper
    pub const WRAPPER_TAG: &str = "t:span";

    /// Attribute carrying the sequential identifier
    pub const IDENTIFIER_ATTRIBUTE: &str = "data-token-id";

    /// Subtrees skipped entirely
    pub const EXCLUDE_SELECTOR: &str = "head, title, meta, script, style, img, audio, video, \
                                        object, iframe, svg, .tagger--disable";

    /// Hard segmentation boundaries
    pub const BLOCK_SELECTOR: &str =
        "p, li, ul, div, h1, h2, h3, h4, h5, h6, td, th, tr, table, img, header, article";

    /// Explicit line breaks
    pub const LINE_BREAK_SELECTOR: &str = "br";
}

/// Segmentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Letter,
    Word,
    Speaking,
    Sentence,
    Space,
    Punctuation,
}

impl Mode {
    pub const ALL: [Mode; 6] = [
        Mode::Letter,
        Mode::Word,
        Mode::Speaking,
        Mode::Sentence,
        Mode::Space,
        Mode::Punctuation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Letter => "letter",
            Mode::Word => "word",
            Mode::Speaking => "speaking",
            Mode::Sentence => "sentence",
            Mode::Space => "space",
            Mode::Punctuation => "punctuation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Mode::Letter => "every grapheme, including spaces and punctuation",
            Mode::Word => "runs of letters, split after apostrophes",
            Mode::Speaking => "letters with attached punctuation, up to the next space",
            Mode::Sentence => "text up to stop punctuation or a block boundary",
            Mode::Space => "every whitespace grapheme (ignored when letter is active)",
            Mode::Punctuation => "every punctuation grapheme (ignored when letter is active)",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "letter" => Ok(Mode::Letter),
            "word" => Ok(Mode::Word),
            "speaking" => Ok(Mode::Speaking),
            "sentence" => Ok(Mode::Sentence),
            "space" => Ok(Mode::Space),
            "punctuation" => Ok(Mode::Punctuation),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// Set of active modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, mode: Mode) {
        self.0 |= mode.bit();
    }

    pub fn contains(&self, mode: Mode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        Mode::ALL.into_iter().filter(|mode| self.contains(*mode))
    }

    /// Parse a list of mode names
    pub fn parse<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse::<Mode>())
            .collect()
    }
}

impl FromIterator<Mode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = Mode>>(iter: I) -> Self {
        let mut set = ModeSet::new();
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.iter().map(Mode::name).collect();
        f.write_str(&names.join(","))
    }
}

/// Class-like labels attached to wrappers when labels are enabled.
/// Opaque to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub token: String,
    pub letter: String,
    pub word: String,
    pub speaking: String,
    pub sentence: String,
    pub punctuation: String,
    pub sentence_stop: String,
    pub whitespace: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            token: "tagger--token".into(),
            letter: "tagger--letter".into(),
            word: "tagger--word".into(),
            speaking: "tagger--speaking".into(),
            sentence: "tagger--sentence".into(),
            punctuation: "tagger--token-punctuation".into(),
            sentence_stop: "tagger--token-sentence-stop".into(),
            whitespace: "tagger--token-whitespace".into(),
        }
    }
}

/// Immutable configuration snapshot
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    pub(crate) modes: ModeSet,
    pub(crate) assign_identifiers: bool,
    pub(crate) identifier_attribute: String,
    pub(crate) use_labels: bool,
    pub(crate) wrapper_tag: String,
    pub(crate) labels: Labels,
    pub(crate) exclude: ElementMatcher,
    pub(crate) block: ElementMatcher,
    pub(crate) line_break: ElementMatcher,
    pub(crate) classifier: DefaultClassifier,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        ConfigBuilder::new()
            .build()
            .expect("Default config should always be valid")
    }
}

impl SegmentationConfig {
    /// Create a configuration builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load a configuration from TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        ConfigFile::from_toml_str(source)?.into_config()
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        ConfigFile::from_file(path)?.into_config()
    }

    pub fn modes(&self) -> ModeSet {
        self.modes
    }

    pub fn has_mode(&self, mode: Mode) -> bool {
        self.modes.contains(mode)
    }

    pub fn assign_identifiers(&self) -> bool {
        self.assign_identifiers
    }

    pub fn identifier_attribute(&self) -> &str {
        &self.identifier_attribute
    }

    pub fn use_labels(&self) -> bool {
        self.use_labels
    }

    pub fn wrapper_tag(&self) -> &str {
        &self.wrapper_tag
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn exclude(&self) -> &ElementMatcher {
        &self.exclude
    }

    pub fn block(&self) -> &ElementMatcher {
        &self.block
    }

    pub fn line_break(&self) -> &ElementMatcher {
        &self.line_break
    }

    pub fn classifier(&self) -> &DefaultClassifier {
        &self.classifier
    }

    /// Validate the configuration
    pub(crate) fn validate(&self) -> Result<()> {
        if self.modes.is_empty() {
            return Err(Error::Configuration(
                "at least one mode must be enabled".into(),
            ));
        }

        if !is_valid_name(&self.wrapper_tag) {
            return Err(Error::Configuration(format!(
                "invalid wrapper tag `{}`",
                self.wrapper_tag
            )));
        }

        if !is_valid_name(&self.identifier_attribute) {
            return Err(Error::Configuration(format!(
                "invalid identifier attribute `{}`",
                self.identifier_attribute
            )));
        }

        if self.use_labels && self.assign_identifiers && self.identifier_attribute == "class" {
            return Err(Error::Configuration(
                "identifier attribute `class` collides with labels".into(),
            ));
        }

        let classifier = self.classifier.config();
        if classifier.stop_punctuation.is_empty() {
            return Err(Error::Configuration(
                "no stop punctuation defined".into(),
            ));
        }

        Ok(())
    }
}

/// Tag and attribute names: a letter followed by word characters, `:`, `.`
/// or `-`
fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-'))
}

#[derive(Debug, Clone)]
enum MatcherSpec {
    Source(String),
    Matcher(ElementMatcher),
}

impl MatcherSpec {
    fn resolve(self) -> Result<ElementMatcher> {
        match self {
            MatcherSpec::Source(source) => ElementMatcher::selector(&source),
            MatcherSpec::Matcher(matcher) => Ok(matcher),
        }
    }
}

/// Fluent builder for [`SegmentationConfig`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    modes: Option<ModeSet>,
    assign_identifiers: Option<bool>,
    identifier_attribute: Option<String>,
    use_labels: Option<bool>,
    wrapper_tag: Option<String>,
    labels: Option<Labels>,
    exclude: Option<MatcherSpec>,
    block: Option<MatcherSpec>,
    line_break: Option<MatcherSpec>,
    classifier: ClassifierConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active modes
    pub fn modes(mut self, modes: impl IntoIterator<Item = Mode>) -> Self {
        self.modes = Some(modes.into_iter().collect());
        self
    }

    /// Replace the active modes by name
    pub fn mode_names<I, S>(mut self, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.modes = Some(ModeSet::parse(names)?);
        Ok(self)
    }

    pub fn assign_identifiers(mut self, enabled: bool) -> Self {
        self.assign_identifiers = Some(enabled);
        self
    }

    pub fn identifier_attribute(mut self, name: impl Into<String>) -> Self {
        self.identifier_attribute = Some(name.into());
        self
    }

    pub fn use_labels(mut self, enabled: bool) -> Self {
        self.use_labels = Some(enabled);
        self
    }

    pub fn wrapper_tag(mut self, tag: impl Into<String>) -> Self {
        self.wrapper_tag = Some(tag.into());
        self
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Selector for subtrees skipped entirely
    pub fn exclude_selector(mut self, selector: impl Into<String>) -> Self {
        self.exclude = Some(MatcherSpec::Source(selector.into()));
        self
    }

    pub fn exclude(mut self, matcher: ElementMatcher) -> Self {
        self.exclude = Some(MatcherSpec::Matcher(matcher));
        self
    }

    /// Selector for block-level boundary elements
    pub fn block_selector(mut self, selector: impl Into<String>) -> Self {
        self.block = Some(MatcherSpec::Source(selector.into()));
        self
    }

    pub fn block(mut self, matcher: ElementMatcher) -> Self {
        self.block = Some(MatcherSpec::Matcher(matcher));
        self
    }

    /// Selector for explicit line-break elements
    pub fn line_break_selector(mut self, selector: impl Into<String>) -> Self {
        self.line_break = Some(MatcherSpec::Source(selector.into()));
        self
    }

    pub fn line_break(mut self, matcher: ElementMatcher) -> Self {
        self.line_break = Some(MatcherSpec::Matcher(matcher));
        self
    }

    pub fn alphabet(mut self, alphabet: Alphabet) -> Self {
        self.classifier.alphabet = alphabet;
        self
    }

    pub fn stop_punctuation(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.classifier.stop_punctuation = chars.into_iter().collect();
        self
    }

    pub fn start_punctuation(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.classifier.start_punctuation = chars.into_iter().collect();
        self
    }

    pub fn apostrophes(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.classifier.apostrophes = chars.into_iter().collect();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<SegmentationConfig> {
        let resolve = |spec: Option<MatcherSpec>, default: &str| {
            spec.unwrap_or_else(|| MatcherSpec::Source(default.to_string()))
                .resolve()
        };

        let config = SegmentationConfig {
            modes: self.modes.unwrap_or_else(|| [Mode::Letter].into_iter().collect()),
            assign_identifiers: self.assign_identifiers.unwrap_or(true),
            identifier_attribute: self
                .identifier_attribute
                .unwrap_or_else(|| defaults::IDENTIFIER_ATTRIBUTE.to_string()),
            use_labels: self.use_labels.unwrap_or(false),
            wrapper_tag: self
                .wrapper_tag
                .unwrap_or_else(|| defaults::WRAPPER_TAG.to_string()),
            labels: self.labels.unwrap_or_default(),
            exclude: resolve(self.exclude, defaults::EXCLUDE_SELECTOR)?,
            block: resolve(self.block, defaults::BLOCK_SELECTOR)?,
            line_break: resolve(self.line_break, defaults::LINE_BREAK_SELECTOR)?,
            classifier: DefaultClassifier::new(self.classifier),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tree::Element;

    #[test]
    fn test_defaults() {
        let config = SegmentationConfig::default();
        assert_eq!(config.modes().iter().collect::<Vec<_>>(), vec![Mode::Letter]);
        assert!(config.assign_identifiers());
        assert!(!config.use_labels());
        assert_eq!(config.wrapper_tag(), "t:span");
        assert_eq!(config.identifier_attribute(), "data-token-id");
        assert!(config.exclude().matches(&Element::new("script")));
        assert!(config.block().matches(&Element::new("p")));
        assert!(config.line_break().matches(&Element::new("br")));
        assert!(!config.block().matches(&Element::new("strong")));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Sentence".parse::<Mode>().unwrap(), Mode::Sentence);
        assert_eq!(" space ".parse::<Mode>().unwrap(), Mode::Space);
        for name in Mode::ALL.map(Mode::name) {
            assert_eq!(name.parse::<Mode>().unwrap().name(), name);
        }
        assert!("spaces".parse::<Mode>().is_err());
        assert!("words".parse::<Mode>().is_err());
        assert!(matches!(
            "paragraph".parse::<Mode>(),
            Err(Error::InvalidMode(name)) if name == "paragraph"
        ));

        let set = ModeSet::parse(["word", "space"]).unwrap();
        assert!(set.contains(Mode::Word));
        assert!(set.contains(Mode::Space));
        assert!(!set.contains(Mode::Letter));
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "word,space");
    }

    #[test]
    fn test_builder_overrides() {
        let config = SegmentationConfig::builder()
            .mode_names(["sentence", "word"])
            .unwrap()
            .wrapper_tag("span")
            .identifier_attribute("data-id")
            .use_labels(true)
            .exclude_selector(".skip")
            .build()
            .unwrap();

        assert!(config.has_mode(Mode::Sentence));
        assert!(config.has_mode(Mode::Word));
        assert_eq!(config.wrapper_tag(), "span");
        assert_eq!(config.identifier_attribute(), "data-id");
        assert!(config.use_labels());

        let mut skipped = Element::new("div");
        skipped.set_attribute("class", "skip");
        assert!(config.exclude().matches(&skipped));
        assert!(!config.exclude().matches(&Element::new("script")));
    }

    #[test]
    fn test_unknown_mode_fails_fast() {
        let result = SegmentationConfig::builder().mode_names(["word", "paragraph"]);
        assert!(matches!(result, Err(Error::InvalidMode(_))));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            SegmentationConfig::builder().modes([]).build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            SegmentationConfig::builder().wrapper_tag("1span").build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            SegmentationConfig::builder().identifier_attribute("").build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            SegmentationConfig::builder()
                .block_selector("div > p")
                .build(),
            Err(Error::InvalidSelector { .. })
        ));
        assert!(matches!(
            SegmentationConfig::builder()
                .use_labels(true)
                .identifier_attribute("class")
                .build(),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            SegmentationConfig::builder().stop_punctuation([]).build(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_custom_matcher() {
        let config = SegmentationConfig::builder()
            .block(ElementMatcher::custom(|e| e.local_name() == "section"))
            .build()
            .unwrap();
        assert!(config.block().matches(&Element::new("section")));
        assert!(!config.block().matches(&Element::new("p")));
    }
}
