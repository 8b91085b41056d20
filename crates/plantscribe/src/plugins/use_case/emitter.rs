//! Use case diagram emitter
//!
//! Packages open a `{ ... }` block holding their contents, nested as deep
//! as the model nests them.

use crate::core::{
    declaration, emit_relations, Aliases, DiagramType, Element, ElementKind, Emitter, EntityModel,
};

/// PlantUML emitter for use case diagrams
pub struct UseCaseEmitter;

impl UseCaseEmitter {
    pub fn new() -> Self {
        Self
    }

    fn element_lines(
        &self,
        model: &EntityModel,
        element: &Element,
        aliases: &Aliases,
        depth: usize,
        lines: &mut Vec<String>,
    ) {
        let indent = "  ".repeat(depth);
        let head = declaration(element, aliases);
        if element.kind != ElementKind::Package {
            lines.push(format!("{}{}", indent, head));
            return;
        }
        lines.push(format!("{}{} {{", indent, head));
        for child in model.children(Some(&element.id)) {
            self.element_lines(model, child, aliases, depth + 1, lines);
        }
        lines.push(format!("{}}}", indent));
    }
}

impl Default for UseCaseEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Emitter for UseCaseEmitter {
    fn emit(&self, model: &EntityModel, aliases: &Aliases) -> Vec<String> {
        let mut lines = vec!["left to right direction".to_string()];
        for element in model.children(None) {
            self.element_lines(model, element, aliases, 0, &mut lines);
        }
        emit_relations(model, aliases, &mut lines);
        lines
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::UseCase
    }

    fn name(&self) -> &'static str {
        "plantuml-use-case"
    }
}
