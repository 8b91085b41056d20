//! Core abstractions for diagram generation
//!
//! The canonical model, the traits every diagram type plugin implements
//! (detector, extractor, emitter), and the ambient pieces shared by the
//! whole pipeline: errors, configuration and logging.

pub mod config;
mod context;
mod database;
mod detector;
mod emitter;
mod error;
mod extractor;
pub mod logging;
pub mod member;
mod model;
mod types;

pub use config::*;
pub use context::*;
pub use database::*;
pub use detector::*;
pub use emitter::*;
pub use error::*;
pub use extractor::*;
pub use logging::*;
pub use model::*;
pub use types::*;
