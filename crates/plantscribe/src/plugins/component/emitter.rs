//! Component diagram emitter

use crate::core::{declaration, emit_relations, Aliases, DiagramType, Emitter, EntityModel};

/// PlantUML emitter for component diagrams
pub struct ComponentEmitter;

impl ComponentEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComponentEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for ComponentEmitter {
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
        DiagramType::Component
    }

    fn name(&self) -> &'static str {
        "plantuml-component"
    }
}
