//! Data model shared by the extractor, the heuristic and the renderers.
//!
//! Spans flow in, an [`Outline`] flows out. Both are plain values owned by
//! a single document run.

mod outline;
mod span;

pub use outline::{HeadingCandidate, HeadingLevel, Outline};
pub use span::{estimate_width, is_bold_font_name, TextSpan};
