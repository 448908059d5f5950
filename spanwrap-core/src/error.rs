//! Error types surfaced to callers
//!
//! Only configuration, parse and serialization failures propagate. Spans that cannot be
//! wrapped are dropped inside the pipeline and never show up here.

use thiserror::Error;

/// Error type for segmentation operations
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid option value or unreadable configuration file
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unknown segmentation mode name
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    /// Matcher that cannot be evaluated
    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Markup could not be read (string entry point only)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tree could not be written back to markup
    #[error("Serialization error: {0}")]
    Serialize(String),
}

/// Result type for segmentation operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidMode("paragraph".into()).to_string(),
            "Invalid mode: paragraph"
        );
        assert_eq!(
            Error::InvalidSelector {
                selector: "p > a".into(),
                reason: "combinators are not supported".into(),
            }
            .to_string(),
            "Invalid selector `p > a`: combinators are not supported"
        );
        assert!(Error::Configuration("x".into())
            .to_string()
            .starts_with("Configuration error:"));
        assert!(Error::Parse("eof".into()).to_string().starts_with("Parse error:"));
        assert!(Error::Serialize("utf-8".into())
            .to_string()
            .starts_with("Serialization error:"));
    }
}
