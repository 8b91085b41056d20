//! Component diagram plugin

mod detector;
mod emitter;
mod extractor;

pub use detector::ComponentDetector;
pub use emitter::ComponentEmitter;
pub use extractor::ComponentExtractor;
