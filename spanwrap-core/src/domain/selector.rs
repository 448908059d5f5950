//! Element matchers for the exclude, block and line-break predicates
//!
//! Selectors are comma separated lists of compound selectors: an optional
//! tag name (or `*`) followed by any number of `.class`, `#id`, `[attr]`
//! and `[attr=value]` parts. Combinators are not supported.

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use smallvec::SmallVec;

use crate::domain::tree::ElementView;
use crate::error::Error;

static COMPOUND: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
static PARTS: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();

const COMPOUND_PATTERN: &str = r#"^(?:\*|[A-Za-z][\w:-]*)?(?:\.[\w-]+|#[\w-]+|\[[A-Za-z_][\w:.-]*(?:=(?:"[^"]*"|'[^']*'|[\w-]+))?\])*$"#;
const PARTS_PATTERN: &str = r#"\.([\w-]+)|#([\w-]+)|\[([A-Za-z_][\w:.-]*)(?:=(?:"([^"]*)"|'([^']*)'|([\w-]+)))?\]"#;

fn compiled(
    cell: &'static OnceLock<Result<Regex, regex::Error>>,
    pattern: &str,
) -> Result<&'static Regex, Error> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| Error::Configuration(format!("selector grammar failed to compile: {e}")))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttributeCondition {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    classes: SmallVec<[String; 2]>,
    ids: SmallVec<[String; 1]>,
    attributes: SmallVec<[AttributeCondition; 1]>,
}

impl Compound {
    fn matches(&self, element: &dyn ElementView) -> bool {
        if let Some(tag) = &self.tag {
            if !element.local_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.classes.iter().all(|class| element.has_class(class))
            && self
                .ids
                .iter()
                .all(|id| element.attribute("id") == Some(id.as_str()))
            && self.attributes.iter().all(|condition| match condition {
                AttributeCondition::Exists(name) => element.attribute(name).is_some(),
                AttributeCondition::Equals(name, value) => {
                    element.attribute(name) == Some(value.as_str())
                }
            })
    }
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parse a selector list. An empty string matches nothing.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let compound_re = compiled(&COMPOUND, COMPOUND_PATTERN)?;
        let parts_re = compiled(&PARTS, PARTS_PATTERN)?;

        let invalid = |reason: &str| Error::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut compounds = Vec::new();
        if source.trim().is_empty() {
            return Ok(Self {
                source: String::new(),
                compounds,
            });
        }

        for part in source.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector in list"));
            }
            if part.contains(char::is_whitespace) || part.contains(['>', '+', '~']) {
                return Err(invalid("combinators are not supported"));
            }
            if !compound_re.is_match(part) {
                return Err(invalid(&format!("cannot parse `{part}`")));
            }

            let tag_end = part.find(['.', '#', '[']).unwrap_or(part.len());
            let tag = &part[..tag_end];
            let mut compound = Compound {
                tag: (!tag.is_empty() && tag != "*").then(|| tag.to_string()),
                ..Compound::default()
            };

            for caps in parts_re.captures_iter(&part[tag_end..]) {
                if let Some(class) = caps.get(1) {
                    compound.classes.push(class.as_str().to_string());
                } else if let Some(id) = caps.get(2) {
                    compound.ids.push(id.as_str().to_string());
                } else if let Some(name) = caps.get(3) {
                    let value = caps.get(4).or(caps.get(5)).or(caps.get(6));
                    compound.attributes.push(match value {
                        Some(value) => AttributeCondition::Equals(
                            name.as_str().to_string(),
                            value.as_str().to_string(),
                        ),
                        None => AttributeCondition::Exists(name.as_str().to_string()),
                    });
                }
            }
            compounds.push(compound);
        }

        Ok(Self {
            source: source.trim().to_string(),
            compounds,
        })
    }

    pub fn matches(&self, element: &dyn ElementView) -> bool {
        self.compounds.iter().any(|c| c.matches(element))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_empty(&self) -> bool {
        self.compounds.is_empty()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Custom element predicate
pub type MatchFn = dyn Fn(&dyn ElementView) -> bool + Send + Sync;

/// Element predicate: a parsed selector or a caller supplied function
#[derive(Clone)]
pub enum ElementMatcher {
    Selector(Selector),
    Custom(Arc<MatchFn>),
}

impl ElementMatcher {
    /// Parse a selector list into a matcher
    pub fn selector(source: &str) -> Result<Self, Error> {
        Selector::parse(source).map(ElementMatcher::Selector)
    }

    /// Wrap a custom predicate
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&dyn ElementView) -> bool + Send + Sync + 'static,
    {
        ElementMatcher::Custom(Arc::new(predicate))
    }

    /// Matcher that never matches
    pub fn none() -> Self {
        ElementMatcher::Selector(Selector::default())
    }

    pub fn matches(&self, element: &dyn ElementView) -> bool {
        match self {
            ElementMatcher::Selector(selector) => selector.matches(element),
            ElementMatcher::Custom(predicate) => predicate(element),
        }
    }
}

impl fmt::Debug for ElementMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementMatcher::Selector(selector) => {
                f.debug_tuple("Selector").field(&selector.as_str()).finish()
            }
            ElementMatcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
