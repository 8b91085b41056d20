//! Sequence diagram plugin
//!
//! Participants exchanging messages, extracted from "X envía Y a Z" style
//! prose.

mod detector;
mod emitter;
mod extractor;

pub use detector::SequenceDetector;
pub use emitter::SequenceEmitter;
pub use extractor::SequenceExtractor;
