//! Activity diagram plugin

mod detector;
mod emitter;
mod extractor;

pub use detector::ActivityDetector;
pub use emitter::ActivityEmitter;
pub use extractor::ActivityExtractor;
