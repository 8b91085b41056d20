//! Activity diagram emitter

use crate::core::{Aliases, DiagramType, Emitter, EntityModel};

/// PlantUML emitter for activity diagrams
///
/// Actions are written in model order between `start` and `stop`.
pub struct ActivityEmitter;

impl ActivityEmitter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ActivityEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for ActivityEmitter {
    fn emit(&self, model: &EntityModel, _aliases: &Aliases) -> Vec<String> {
        let mut lines = vec!["start".to_string()];
        for element in model.elements() {
            lines.push(format!(":{};", element.name.replace(';', ",")));
        }
        lines.push("stop".to_string());
        lines
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Activity
    }

    fn name(&self) -> &'static str {
        "plantuml-activity"
    }
}
