//! In-place editing of JSON entity models
//!
//! Each [`EditAction`] is one change to a model file: create it, add or
//! look up elements, rename, remove, attach members in compact notation
//! (`id:int`, `+crear(nombre: String): void`) and connect elements.

use anyhow::{anyhow, bail, Result};
use clap::Subcommand;

use plantscribe::core::member::{parse_member, Member};
use plantscribe::prelude::*;
use plantscribe::Method;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Start a new, empty model file
    Init {
        /// Diagram type of the new model
        #[arg(long = "type", value_name = "DIAGRAM_TYPE")]
        diagram_type: DiagramType,
    },

    /// Add an element
    Add {
        /// Element id
        id: String,

        /// Element kind (class, interface, actor, use_case, package, ...)
        #[arg(long)]
        kind: ElementKind,

        /// Display name (defaults to the id)
        #[arg(long)]
        name: Option<String>,

        /// Id of the package that holds the element
        #[arg(long)]
        package: Option<String>,

        /// Mark a use case actor or use case as a business element
        #[arg(long)]
        business: bool,

        /// Stereotype shown as <<stereotype>>
        #[arg(long)]
        stereotype: Option<String>,
    },

    /// Print one element, found by id or by display name
    Show {
        /// Element id or name
        element: String,
    },

    /// Change the display name of an element
    Rename {
        /// Element id
        id: String,

        /// New display name
        name: String,
    },

    /// Remove an element and every relation touching it
    Remove {
        /// Element id
        id: String,
    },

    /// Add an attribute, e.g. `id:int` or `-saldo: double`
    AddAttribute {
        /// Element id
        id: String,

        /// Attribute in compact notation
        member: String,
    },

    /// Add a method, e.g. `crear()` or `+pagar(monto: double): bool`
    AddMethod {
        /// Element id
        id: String,

        /// Method in compact notation
        member: String,
    },

    /// Remove an attribute by name
    RemoveAttribute {
        /// Element id
        id: String,

        /// Attribute name
        name: String,
    },

    /// Remove a method by name
    RemoveMethod {
        /// Element id
        id: String,

        /// Method name
        name: String,
    },

    /// Connect two elements
    Relate {
        /// Source element id
        from: String,

        /// Target element id
        to: String,

        /// Relation kind
        #[arg(long, default_value = "association")]
        kind: RelationKind,

        /// Label shown on the connector
        #[arg(long)]
        label: Option<String>,
    },

    /// Remove every relation from one element to another
    Unrelate {
        /// Source element id
        from: String,

        /// Target element id
        to: String,
    },
}

/// What an edit did to the model
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// Whether the model must be written back
    pub changed: bool,
    pub message: String,
}

impl EditOutcome {
    fn changed(message: String) -> Self {
        Self {
            changed: true,
            message,
        }
    }

    fn unchanged(message: String) -> Self {
        Self {
            changed: false,
            message,
        }
    }
}

/// Apply `action` to `model`
///
/// `Init` is handled by the caller, which owns the file; here it only
/// checks that the model is empty.
pub fn apply(model: &mut EntityModel, action: EditAction) -> Result<EditOutcome> {
    let outcome = match action {
        EditAction::Init { diagram_type } => {
            if !model.elements().is_empty() || model.diagram_type() != diagram_type {
                bail!("init needs a new model file");
            }
            EditOutcome::changed(format!("Created empty {} model", diagram_type))
        }
        EditAction::Add {
            id,
            kind,
            name,
            package,
            business,
            stereotype,
        } => {
            let name = name.unwrap_or_else(|| id.clone());
            let mut element = Element::new(id.clone(), kind, name);
            if let Some(package) = package {
                element = element.in_package(package);
            }
            if business {
                element = element.business();
            }
            if let Some(stereotype) = stereotype {
                element = element.with_stereotype(stereotype);
            }
            model.add_element(element)?;
            EditOutcome::changed(format!("Added {} '{}'", kind, id))
        }
        EditAction::Show { element } => {
            let found = model
                .element(&element)
                .or_else(|| model.find_by_name(&element))
                .ok_or_else(|| anyhow!("No element '{}'", element))?;
            EditOutcome::unchanged(serde_json::to_string_pretty(found)?)
        }
        EditAction::Rename { id, name } => {
            model.rename_element(&id, name.clone())?;
            EditOutcome::changed(format!("Renamed '{}' to '{}'", id, name))
        }
        EditAction::Remove { id } => {
            let removed = model
                .remove_element(&id)
                .ok_or_else(|| anyhow!("No element '{}'", id))?;
            EditOutcome::changed(format!("Removed {} '{}'", removed.kind, id))
        }
        EditAction::AddAttribute { id, member } => match parse_member(&member)? {
            Member::Attribute(attribute) => {
                let name = attribute.name.clone();
                model.add_attribute(&id, attribute)?;
                EditOutcome::changed(format!("Added attribute '{}' to '{}'", name, id))
            }
            Member::Method(_) => bail!("'{}' is a method; use add-method", member),
        },
        EditAction::AddMethod { id, member } => {
            let method = match parse_member(&member)? {
                Member::Method(method) => method,
                // `crear` without parentheses is still a method here
                Member::Attribute(attribute) => {
                    Method::new(attribute.name).with_visibility(attribute.visibility)
                }
            };
            let name = method.name.clone();
            model.add_method(&id, method)?;
            EditOutcome::changed(format!("Added method '{}' to '{}'", name, id))
        }
        EditAction::RemoveAttribute { id, name } => {
            if !model.remove_attribute(&id, &name) {
                bail!("'{}' has no attribute '{}'", id, name);
            }
            EditOutcome::changed(format!("Removed attribute '{}' from '{}'", name, id))
        }
        EditAction::RemoveMethod { id, name } => {
            if !model.remove_method(&id, &name) {
                bail!("'{}' has no method '{}'", id, name);
            }
            EditOutcome::changed(format!("Removed method '{}' from '{}'", name, id))
        }
        EditAction::Relate {
            from,
            to,
            kind,
            label,
        } => {
            let mut relation = Relation::new(from.clone(), to.clone(), kind);
            if let Some(label) = label {
                relation = relation.with_label(label);
            }
            model.add_relation(relation)?;
            EditOutcome::changed(format!("Added {} {} -> {}", kind, from, to))
        }
        EditAction::Unrelate { from, to } => match model.remove_relations(&from, &to) {
            0 => bail!("No relation {} -> {}", from, to),
            count => EditOutcome::changed(format!("Removed {} relation(s) {} -> {}", count, from, to)),
        },
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_model() -> EntityModel {
        let mut model = EntityModel::new(DiagramType::Class);
        apply(
            &mut model,
            EditAction::Add {
                id: "User".into(),
                kind: ElementKind::Class,
                name: None,
                package: None,
                business: false,
                stereotype: None,
            },
        )
        .unwrap();
        model
    }

    #[test]
    fn test_add_members_in_compact_notation() {
        let mut model = class_model();
        apply(
            &mut model,
            EditAction::AddAttribute {
                id: "User".into(),
                member: "-id:int".into(),
            },
        )
        .unwrap();
        apply(
            &mut model,
            EditAction::AddMethod {
                id: "User".into(),
                member: "login".into(),
            },
        )
        .unwrap();

        let user = model.element("User").unwrap();
        assert_eq!(user.attributes[0].attr_type, "int");
        assert_eq!(user.attributes[0].visibility, plantscribe::Visibility::Private);
        assert_eq!(user.methods[0].name, "login");
        assert_eq!(user.methods[0].return_type, "void");
    }

    #[test]
    fn test_method_is_not_an_attribute() {
        let mut model = class_model();
        let err = apply(
            &mut model,
            EditAction::AddAttribute {
                id: "User".into(),
                member: "crear()".into(),
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("add-method"));
    }

    #[test]
    fn test_show_does_not_change_the_model() {
        let mut model = class_model();
        let outcome = apply(
            &mut model,
            EditAction::Show {
                element: "user".into(),
            },
        )
        .unwrap();
        assert!(!outcome.changed);
        assert!(outcome.message.contains("\"id\": \"User\""));
    }

    #[test]
    fn test_relate_and_unrelate() {
        let mut model = class_model();
        apply(
            &mut model,
            EditAction::Add {
                id: "Role".into(),
                kind: ElementKind::Class,
                name: None,
                package: None,
                business: false,
                stereotype: None,
            },
        )
        .unwrap();
        let relate = EditAction::Relate {
            from: "User".into(),
            to: "Role".into(),
            kind: RelationKind::Aggregation,
            label: Some("has".into()),
        };
        apply(&mut model, relate).unwrap();
        assert_eq!(model.relations()[0].label.as_deref(), Some("has"));

        let unrelate = EditAction::Unrelate {
            from: "User".into(),
            to: "Role".into(),
        };
        apply(&mut model, unrelate.clone()).unwrap();
        assert!(apply(&mut model, unrelate).is_err());
    }

    #[test]
    fn test_rejected_edits_leave_the_model_alone() {
        let mut model = class_model();
        let before = model.clone();
        assert!(apply(
            &mut model,
            EditAction::Rename {
                id: "User".into(),
                name: "A\n@enduml".into(),
            },
        )
        .is_err());
        assert!(apply(
            &mut model,
            EditAction::Add {
                id: "Clerk".into(),
                kind: ElementKind::Actor,
                name: None,
                package: None,
                business: false,
                stereotype: None,
            },
        )
        .is_err());
        assert_eq!(model, before);
    }
}
