//! Class diagram emitter
//!
//! Writes one declaration per element, with a member block when the
//! element has attributes or methods, then one line per relation.

use tracing::trace;

use crate::core::{
    declaration, emit_relations, Aliases, Attribute, DiagramType, Element, ElementKind, Emitter,
    EntityModel, Method,
};

/// PlantUML emitter for class diagrams
pub struct ClassEmitter;

impl ClassEmitter {
    pub fn new() -> Self {
        Self
    }

    fn attribute_line(&self, kind: ElementKind, attribute: &Attribute) -> String {
        // Enum entries are bare constants
        if kind == ElementKind::Enum {
            return format!("  {}", attribute.name);
        }
        format!(
            "  {}{}{} : {}",
            modifier_prefix(attribute.modifier.map(|m| m.tag())),
            attribute.visibility.to_char(),
            attribute.name,
            attribute.attr_type
        )
    }

    fn method_line(&self, method: &Method) -> String {
        let params = method
            .params
            .iter()
            .map(|p| format!("{} : {}", p.name, p.param_type))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "  {}{}{}({}) : {}",
            modifier_prefix(method.modifier.map(|m| m.tag())),
            method.visibility.to_char(),
            method.name,
            params,
            method.return_type
        )
    }

    fn element_lines(&self, element: &Element, aliases: &Aliases, lines: &mut Vec<String>) {
        let head = declaration(element, aliases);
        if element.member_count() == 0 {
            lines.push(head);
            return;
        }
        lines.push(format!("{} {{", head));
        for attribute in &element.attributes {
            lines.push(self.attribute_line(element.kind, attribute));
        }
        for method in &element.methods {
            lines.push(self.method_line(method));
        }
        lines.push("}".to_string());
    }
}

impl Default for ClassEmitter {
    fn default() -> Self {
        Self::new()
    }
}

fn modifier_prefix(tag: Option<&str>) -> String {
    tag.map(|t| format!("{} ", t)).unwrap_or_default()
}

impl Emitter for ClassEmitter {
    fn emit(&self, model: &EntityModel, aliases: &Aliases) -> Vec<String> {
        let mut lines = Vec::new();
        for element in model.elements() {
            trace!(id = %element.id, members = element.member_count(), "Emitting class");
            self.element_lines(element, aliases, &mut lines);
        }
        emit_relations(model, aliases, &mut lines);
        lines
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Class
    }

    fn name(&self) -> &'static str {
        "plantuml-class"
    }
}
