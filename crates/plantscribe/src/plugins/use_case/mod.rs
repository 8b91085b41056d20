//! Use case diagram plugin

mod detector;
mod emitter;
mod extractor;

pub use detector::UseCaseDetector;
pub use emitter::UseCaseEmitter;
pub use extractor::UseCaseExtractor;
