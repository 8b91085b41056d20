//! Sequence diagram emitter
//!
//! Participants are declared up front so their order on the diagram
//! follows the model rather than first use in a message.

use crate::core::{declaration, emit_relations, Aliases, DiagramType, Emitter, EntityModel};

/// PlantUML emitter for sequence diagrams
pub struct SequenceEmitter;

impl SequenceEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequenceEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for SequenceEmitter {
    fn emit(&self, model: &EntityModel, aliases: &Aliases) -> Vec<String> {
        let mut lines: Vec<String> = model
            .elements()
            .iter()
            .map(|e| declaration(e, aliases))
            .collect();
        emit_relations(model, aliases, &mut lines);
        lines
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Sequence
    }

    fn name(&self) -> &'static str {
        "plantuml-sequence"
    }
}
