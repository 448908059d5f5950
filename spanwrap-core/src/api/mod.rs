//! Public entry points
//!
//! [`Segmenter`] and the free functions [`segment`] / [`segment_markup`]
//! run the whole pipeline. A [`TaggingSession`] carries identifier numbering
//! from one run to the next when several trees should share one sequence.

mod input;
mod report;
mod segmenter;
mod session;


pub use input::Input;
pub use report::{KindCounts, SegmentReport};
pub use segmenter::{segment, segment_markup, SegmentedMarkup, Segmenter};
pub use session::TaggingSession;
