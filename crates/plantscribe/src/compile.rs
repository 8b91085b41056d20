//! Deterministic [`EntityModel`] to PlantUML compilation

use std::collections::HashMap;

use tracing::{debug, span, Level};

use crate::core::{Aliases, DiagramType, Emitter, EntityModel, PipelineError};
use crate::plugins::emitter_for;

/// Compiles validated models into a single `@startuml` block
///
/// Pure: the model is only read, and the same model always yields the
/// same bytes.
pub struct PumlCompiler {
    emitters: HashMap<DiagramType, Box<dyn Emitter>>,
}

impl PumlCompiler {
    pub fn new() -> Self {
        let emitters = DiagramType::all()
            .iter()
            .map(|t| (*t, emitter_for(*t)))
            .collect();
        Self { emitters }
    }

    /// Replace the emitter for its diagram type
    pub fn register_emitter(&mut self, emitter: Box<dyn Emitter>) {
        self.emitters.insert(emitter.diagram_type(), emitter);
    }

    pub fn compile(&self, model: &EntityModel) -> Result<String, PipelineError> {
        let compile_span = span!(
            Level::INFO,
            "compile",
            diagram_type = %model.diagram_type(),
            elements = model.elements().len()
        );
        let _enter = compile_span.enter();

        model.validate()?;

        let emitter = self.emitters.get(&model.diagram_type()).ok_or_else(|| {
            PipelineError::schema_violation(format!(
                "no emitter registered for {} diagrams",
                model.diagram_type()
            ))
        })?;

        let aliases = Aliases::for_model(model);
        let body = emitter.emit(model, &aliases);

        let mut out = String::from("@startuml\n");
        for line in &body {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("@enduml\n");

        debug!(emitter = emitter.name(), lines = body.len() + 2, "Compilation completed");
        Ok(out)
    }
}

impl Default for PumlCompiler {
    fn default() -> Self {
        Self::new()
    }
}
