//! TOML schema for configuration files
//!
//! Every table and key is optional; missing keys keep the builder default.
//!
//! ```toml
//! [segmentation]
//! modes = ["sentence", "word"]
//! wrapper_tag = "span"
//!
//! [selectors]
//! exclude = "script, style, .no-tag"
//!
//! [classifier]
//! alphabet = "unicode-alphanumeric"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{defaults, ConfigBuilder, Labels, SegmentationConfig};
use crate::domain::classifier::{
    Alphabet, DEFAULT_APOSTROPHES, DEFAULT_START_PUNCTUATION, DEFAULT_STOP_PUNCTUATION,
};
use crate::error::{Error, Result};

/// Root of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub segmentation: SegmentationSection,
    #[serde(default)]
    pub selectors: SelectorSection,
    #[serde(default)]
    pub labels: LabelSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
}

/// `[segmentation]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentationSection {
    pub modes: Option<Vec<String>>,
    pub assign_identifiers: Option<bool>,
    pub identifier_attribute: Option<String>,
    pub use_labels: Option<bool>,
    pub wrapper_tag: Option<String>,
}

/// `[selectors]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectorSection {
    pub exclude: Option<String>,
    pub block: Option<String>,
    pub line_break: Option<String>,
}

/// `[labels]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelSection {
    pub token: Option<String>,
    pub letter: Option<String>,
    pub word: Option<String>,
    pub speaking: Option<String>,
    pub sentence: Option<String>,
    pub punctuation: Option<String>,
    pub sentence_stop: Option<String>,
    pub whitespace: Option<String>,
}

impl LabelSection {
    fn merge_into(self, mut labels: Labels) -> Labels {
        let fields = [
            (self.token, &mut labels.token),
            (self.letter, &mut labels.letter),
            (self.word, &mut labels.word),
            (self.speaking, &mut labels.speaking),
            (self.sentence, &mut labels.sentence),
            (self.punctuation, &mut labels.punctuation),
            (self.sentence_stop, &mut labels.sentence_stop),
            (self.whitespace, &mut labels.whitespace),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        labels
    }
}

/// `[classifier]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierSection {
    pub alphabet: Option<Alphabet>,
    pub stop_punctuation: Option<Vec<char>>,
    pub start_punctuation: Option<Vec<char>>,
    pub apostrophes: Option<Vec<char>>,
}

impl ConfigFile {
    /// Parse TOML text
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source)
            .map_err(|e| Error::Configuration(format!("Failed to parse configuration: {e}")))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&source)
    }

    /// Apply every key present in the file on top of `builder`
    pub fn apply(self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        let segmentation = self.segmentation;
        if let Some(modes) = segmentation.modes {
            builder = builder.mode_names(modes)?;
        }
        if let Some(enabled) = segmentation.assign_identifiers {
            builder = builder.assign_identifiers(enabled);
        }
        if let Some(name) = segmentation.identifier_attribute {
            builder = builder.identifier_attribute(name);
        }
        if let Some(enabled) = segmentation.use_labels {
            builder = builder.use_labels(enabled);
        }
        if let Some(tag) = segmentation.wrapper_tag {
            builder = builder.wrapper_tag(tag);
        }

        if let Some(selector) = self.selectors.exclude {
            builder = builder.exclude_selector(selector);
        }
        if let Some(selector) = self.selectors.block {
            builder = builder.block_selector(selector);
        }
        if let Some(selector) = self.selectors.line_break {
            builder = builder.line_break_selector(selector);
        }

        builder = builder.labels(self.labels.merge_into(Labels::default()));

        let classifier = self.classifier;
        if let Some(alphabet) = classifier.alphabet {
            builder = builder.alphabet(alphabet);
        }
        if let Some(chars) = classifier.stop_punctuation {
            builder = builder.stop_punctuation(chars);
        }
        if let Some(chars) = classifier.start_punctuation {
            builder = builder.start_punctuation(chars);
        }
        if let Some(chars) = classifier.apostrophes {
            builder = builder.apostrophes(chars);
        }

        Ok(builder)
    }

    /// Build a validated configuration from the file alone
    pub fn into_config(self) -> Result<SegmentationConfig> {
        self.apply(ConfigBuilder::new())?.build()
    }

    /// File with every key spelled out at its default value
    pub fn with_defaults() -> Self {
        let labels = Labels::default();
        Self {
            segmentation: SegmentationSection {
                modes: Some(vec!["letter".to_string()]),
                assign_identifiers: Some(true),
                identifier_attribute: Some(defaults::IDENTIFIER_ATTRIBUTE.to_string()),
                use_labels: Some(false),
                wrapper_tag: Some(defaults::WRAPPER_TAG.to_string()),
            },
            selectors: SelectorSection {
                exclude: Some(defaults::EXCLUDE_SELECTOR.to_string()),
                block: Some(defaults::BLOCK_SELECTOR.to_string()),
                line_break: Some(defaults::LINE_BREAK_SELECTOR.to_string()),
            },
            labels: LabelSection {
                token: Some(labels.token),
                letter: Some(labels.letter),
                word: Some(labels.word),
                speaking: Some(labels.speaking),
                sentence: Some(labels.sentence),
                punctuation: Some(labels.punctuation),
                sentence_stop: Some(labels.sentence_stop),
                whitespace: Some(labels.whitespace),
            },
            classifier: ClassifierSection {
                alphabet: Some(Alphabet::default()),
                stop_punctuation: Some(DEFAULT_STOP_PUNCTUATION.to_vec()),
                start_punctuation: Some(DEFAULT_START_PUNCTUATION.to_vec()),
                apostrophes: Some(DEFAULT_APOSTROPHES.to_vec()),
            },
        }
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Configuration(format!("Failed to serialize configuration: {e}")))
    }
}
