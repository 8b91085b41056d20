//! Core emitter trait for PlantUML output
//!
//! An emitter writes the body of one diagram type, between `@startuml`
//! and `@enduml`. Emitters only ever see models that already passed
//! validation.

use std::collections::{HashMap, HashSet};

use super::model::{Element, EntityModel, Relation};
use super::types::{Connector, DiagramType};

/// Core trait for PlantUML body emitters
pub trait Emitter: Send + Sync {
    /// Emit the body lines for `model`, elements first then relations
    fn emit(&self, model: &EntityModel, aliases: &Aliases) -> Vec<String>;

    /// The diagram type this emitter handles
    fn diagram_type(&self) -> DiagramType;

    /// Get the name of this emitter
    fn name(&self) -> &'static str;
}

/// PlantUML references for element ids
///
/// Ids that are plain identifiers are used as-is. Anything else gets a
/// generated alias, so names with spaces or punctuation still compile.
#[derive(Debug, Clone, Default)]
pub struct Aliases {
    map: HashMap<String, String>,
}

impl Aliases {
    pub fn for_model(model: &EntityModel) -> Self {
        let mut taken: HashSet<String> = model
            .elements()
            .iter()
            .filter(|e| is_identifier(&e.id))
            .map(|e| e.id.clone())
            .collect();

        let mut map = HashMap::new();
        for (index, element) in model.elements().iter().enumerate() {
            let alias = if is_identifier(&element.id) {
                element.id.clone()
            } else {
                let mut candidate = format!("e{}", index + 1);
                while taken.contains(&candidate) {
                    candidate.push('_');
                }
                taken.insert(candidate.clone());
                candidate
            };
            map.insert(element.id.clone(), alias);
        }
        Self { map }
    }

    pub fn get<'a>(&'a self, id: &'a str) -> &'a str {
        self.map.get(id).map(String::as_str).unwrap_or(id)
    }
}

/// Letters, digits and underscores, not starting with a digit
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Double-quote a string for PlantUML
pub fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "'"))
}

/// `keyword Name`, or `keyword "Display Name" as alias` when they differ
///
/// Business actors and use cases take the slashed keyword (`actor/`).
pub fn declaration(element: &Element, aliases: &Aliases) -> String {
    let alias = aliases.get(&element.id);
    let keyword = if element.business {
        format!("{}/", element.kind.keyword())
    } else {
        element.kind.keyword().to_string()
    };
    let mut line = if element.name == alias {
        format!("{} {}", keyword, alias)
    } else {
        format!("{} {} as {}", keyword, quote(&element.name), alias)
    };
    if let Some(stereotype) = &element.stereotype {
        let stereotype = stereotype.trim_matches(|c| c == '<' || c == '>');
        if !stereotype.is_empty() {
            line.push_str(&format!(" <<{}>>", stereotype));
        }
    }
    line
}

/// `from "m1" <arrow> "m2" to : label`
pub fn relation_line(relation: &Relation, connector: &Connector, aliases: &Aliases) -> String {
    let mut line = aliases.get(&relation.from_id).to_string();
    if let Some(m) = &relation.multiplicity_from {
        line.push(' ');
        line.push_str(&quote(m));
    }
    line.push(' ');
    line.push_str(connector.arrow);
    if let Some(m) = &relation.multiplicity_to {
        line.push(' ');
        line.push_str(&quote(m));
    }
    line.push(' ');
    line.push_str(aliases.get(&relation.to_id));

    let label = match (connector.stereotype, relation.label.as_deref()) {
        (Some(s), Some(l)) => Some(format!("{} {}", s, l)),
        (Some(s), None) => Some(s.to_string()),
        (None, Some(l)) => Some(l.to_string()),
        (None, None) => None,
    };
    if let Some(label) = label {
        line.push_str(" : ");
        line.push_str(&label);
    }
    line
}

/// Append one line per relation, in model order
///
/// Relations without a connector never reach here; validation rejects them.
pub fn emit_relations(model: &EntityModel, aliases: &Aliases, lines: &mut Vec<String>) {
    for relation in model.relations() {
        if let Some(connector) = model.diagram_type().connector(relation.kind) {
            lines.push(relation_line(relation, &connector, aliases));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{ElementKind, RelationKind};

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("User"));
        assert!(is_identifier("comprar_producto"));
        assert!(is_identifier("Categoría"));
        assert!(!is_identifier("Nombre Largo"));
        assert!(!is_identifier("1st"));
        assert!(!is_identifier(""));
    }

    #[test]
    fn test_aliases_for_unsafe_ids() {
        let mut model = EntityModel::new(DiagramType::Class);
        model
            .add_element(Element::new("Order Line", ElementKind::Class, "Order Line"))
            .unwrap();
        model
            .add_element(Element::new("e1", ElementKind::Class, "e1"))
            .unwrap();
        let aliases = Aliases::for_model(&model);
        assert_eq!(aliases.get("Order Line"), "e1_");
        assert_eq!(aliases.get("e1"), "e1");
    }

    #[test]
    fn test_declaration_forms() {
        let aliases = Aliases::default();
        let plain = Element::new("User", ElementKind::Class, "User");
        assert_eq!(declaration(&plain, &aliases), "class User");

        let named = Element::new("cliente", ElementKind::Actor, "Cliente");
        assert_eq!(declaration(&named, &aliases), "actor \"Cliente\" as cliente");

        let tagged = Element::new("Repo", ElementKind::Interface, "Repo").with_stereotype("<<port>>");
        assert_eq!(declaration(&tagged, &aliases), "interface Repo <<port>>");

        let business = Element::new("clerk", ElementKind::Actor, "Clerk").business();
        assert_eq!(declaration(&business, &aliases), "actor/ \"Clerk\" as clerk");
    }

    #[test]
    fn test_relation_line_with_multiplicity_and_stereotype() {
        let aliases = Aliases::default();
        let relation = Relation::new("Car", "Wheel", RelationKind::Composition)
            .with_multiplicity("1", "4")
            .with_label("has");
        let connector = DiagramType::Class.connector(RelationKind::Composition).unwrap();
        assert_eq!(
            relation_line(&relation, &connector, &aliases),
            "Car \"1\" *-- \"4\" Wheel : has"
        );

        let include = Relation::new("login", "validar", RelationKind::Include);
        let connector = DiagramType::UseCase.connector(RelationKind::Include).unwrap();
        assert_eq!(
            relation_line(&include, &connector, &aliases),
            "login ..> validar : <<include>>"
        );
    }
}
