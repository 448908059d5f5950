//! Letter, word, speaking-unit and sentence segmentation inside markup trees
//!
//! The engine walks a tree of nested markup, splits every text leaf into
//! grapheme tokens, decides where letter, word, speaking-unit and sentence
//! boundaries fall, and wraps each resulting span in a new element. The
//! surrounding markup (inline emphasis, block boundaries, embedded content)
//! is preserved: tokens are re-parented, never removed or reordered.
//!
//! # Architecture
//!
//! - **Domain layer**: classifier, tokenizer, boundary resolver, tree
//!   mutator and span assembler, generic over [`MarkupTree`]
//! - **Markup bridge**: html5ever based parsing into the [`Document`] arena
//!   and serialization back to text
//! - **API layer**: [`Segmenter`], [`TaggingSession`] and the [`segment`] /
//!   [`segment_markup`] entry points
//!
//! # Example
//!
//! ```rust
//! use spanwrap_core::{segment_markup, SegmentationConfig};
//!
//! let config = SegmentationConfig::builder()
//!     .mode_names(["word"])
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let html = segment_markup("The <strong>quick</strong> fox", &config).unwrap();
//! assert_eq!(
//!     html,
//!     concat!(
//!         r#"<t:span data-token-id="0">The</t:span> "#,
//!         r#"<t:span data-token-id="1"><strong>quick</strong></t:span> "#,
//!         r#"<t:span data-token-id="2">fox</t:span>"#,
//!     )
//! );
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod markup;

pub use api::{
    segment, segment_markup, Input, KindCounts, SegmentReport, SegmentedMarkup, Segmenter,
    TaggingSession,
};
pub use config::{defaults, ConfigBuilder, ConfigFile, Labels, Mode, ModeSet, SegmentationConfig};
pub use domain::{
    Alphabet, CharacterClass, CharacterClassifier, Document, Element, ElementMatcher, ElementView,
    MarkupTree, NodeData, NodeId, NodeKind, Selector, Span, SpanKind,
};
pub use error::{Error, Result};
pub use markup::{Markup, MarkupKind};
