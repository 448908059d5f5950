//! Segmentation engine
//!
//! Pipeline stages, leaves first: character classification, tokenization,
//! boundary resolution, span assembly and tree mutation. Everything here is
//! generic over [`tree::MarkupTree`].

pub mod assembler;
pub mod boundary;
pub mod classifier;
pub mod mutator;
pub mod selector;
pub mod span;
pub mod token;
pub mod tokenizer;
pub mod tree;

pub use assembler::{assemble, Assembly, ExecutedSpan, IdentifierCounter};
pub use boundary::{resolve, BoundaryResolver, TokenFacts};
pub use classifier::{
    Alphabet, CharacterClass, CharacterClassifier, ClassifierConfig, DefaultClassifier,
};
pub use mutator::TreeMutator;
pub use selector::{ElementMatcher, Selector};
pub use span::{Span, SpanKind};
pub use token::{AtomicToken, TokenStream};
pub use tokenizer::{tokenize, Tokens};
pub use tree::{Document, Element, ElementView, MarkupTree, NodeData, NodeId, NodeKind};
