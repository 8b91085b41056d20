//! Class diagram plugin
//!
//! Keyword detection, text extraction and PlantUML emission for class
//! diagrams.

mod detector;
mod emitter;
mod extractor;

pub use detector::ClassDetector;
pub use emitter::ClassEmitter;
pub use extractor::ClassExtractor;
