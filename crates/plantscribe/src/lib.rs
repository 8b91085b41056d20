//! Plantscribe - Turn free-text software design descriptions into PlantUML
//!
//! A request flows through four stages:
//! text → [`DiagramClassifier`](classify::DiagramClassifier) → intent →
//! [`JsonBuilder`](builder::JsonBuilder) → [`EntityModel`](core::EntityModel) →
//! [`PumlCompiler`](compile::PumlCompiler) → PlantUML source, optionally
//! followed by an external [`RenderDelegate`](render::RenderDelegate).
//!
//! # Quick Start
//!
//! Compile a JSON model directly:
//!
//! ```rust
//! let json = r#"{
//!     "diagram_type": "class",
//!     "elements": [{"id": "User", "kind": "class", "name": "User",
//!                   "attributes": [{"name": "id", "type": "int", "visibility": "+"}]}]
//! }"#;
//! let puml = plantscribe::compile_json(json).unwrap();
//! assert!(puml.starts_with("@startuml\n"));
//! assert!(puml.contains("  +id : int"));
//! ```
//!
//! # Full Pipeline
//!
//! ```rust
//! use plantscribe::prelude::*;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let pipeline = Pipeline::offline(PipelineConfig::default());
//! let request = SubmitRequest::new("clases Persona y Alumno. Alumno hereda de Persona");
//! let output = pipeline.process(&request).await.unwrap();
//!
//! assert_eq!(output.classification.intent, DiagramType::Class);
//! assert!(output.puml.contains("Alumno --|> Persona"));
//! # });
//! ```

pub mod builder;
pub mod classify;
pub mod compile;
pub mod core;
pub mod plugins;
pub mod render;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::builder::{BuildOutput, JsonBuilder};
    pub use crate::classify::{
        Classification, ClassificationDelegate, DelegateError, DiagramClassifier,
        KeywordDelegate, LlmDelegate,
    };
    pub use crate::compile::PumlCompiler;
    pub use crate::core::{
        BuildWarning, DiagramType, Element, ElementKind, EntityModel, ErrorCategory,
        PipelineConfig, PipelineError, Relation, RelationKind, RequestContext,
    };
    pub use crate::plugins::orchestrator::{
        Pipeline, PipelineOutput, SubmitRequest, SubmitResponse,
    };
    pub use crate::render::{ImageHandle, PlantUmlJar, RenderDelegate};
}

/// Compile a JSON [`EntityModel`] into PlantUML source
///
/// # Returns
/// * `Ok(String)` - One `@startuml` … `@enduml` block
/// * `Err` - [`PipelineError::SchemaViolation`] for malformed JSON or a
///   model that breaks an invariant
pub fn compile_json(json: &str) -> Result<String, PipelineError> {
    let model = EntityModel::from_json(json)?;
    compile::PumlCompiler::new().compile(&model)
}

/// Run the whole pipeline with the offline keyword classifier
///
/// # Example
/// ```rust
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let output = plantscribe::generate_offline("actor Cliente. Cliente puede comprar producto")
///     .await
///     .unwrap();
/// assert!(output.puml.contains("actor \"Cliente\" as cliente"));
/// # });
/// ```
pub async fn generate_offline(
    text: &str,
) -> Result<plugins::orchestrator::PipelineOutput, PipelineError> {
    let pipeline = plugins::orchestrator::Pipeline::offline(PipelineConfig::default());
    pipeline
        .process(&plugins::orchestrator::SubmitRequest::new(text))
        .await
}
