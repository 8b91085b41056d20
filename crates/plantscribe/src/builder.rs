//! Text to [`EntityModel`] construction
//!
//! The per-type [`Extractor`] does the reading; the builder turns its
//! best-effort output into a model that satisfies every invariant. Nothing
//! is invented: entities that cannot be kept are dropped and reported as
//! [`BuildWarning`]s.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info, span, warn, Level};

use crate::core::{
    BuildWarning, DiagramType, Element, ElementKind, EntityModel, Extraction, Extractor, Metadata,
    PipelineError, Relation, RequestContext,
};
use crate::plugins::extractor_for;

/// A validated model plus everything dropped on the way
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildOutput {
    pub model: EntityModel,
    pub warnings: Vec<BuildWarning>,
}

pub struct JsonBuilder {
    metadata: Metadata,
}

impl JsonBuilder {
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
        }
    }

    /// Attach provenance to every model this builder produces
    pub fn with_metadata(metadata: Metadata) -> Self {
        Self { metadata }
    }

    pub fn build(
        &self,
        text: &str,
        intent: DiagramType,
        context: &RequestContext,
    ) -> Result<BuildOutput, PipelineError> {
        let extractor = extractor_for(intent);
        self.build_with(extractor.as_ref(), text, context)
    }

    /// Build with a specific extractor; its diagram type is the intent
    pub fn build_with(
        &self,
        extractor: &dyn Extractor,
        text: &str,
        context: &RequestContext,
    ) -> Result<BuildOutput, PipelineError> {
        let build_span = span!(
            Level::INFO,
            "build_model",
            diagram_type = %extractor.diagram_type(),
            input_len = text.len()
        );
        let _enter = build_span.enter();

        let extraction = extractor.extract(text, context);
        debug!(
            extractor = extractor.name(),
            elements = extraction.elements.len(),
            relations = extraction.relations.len(),
            "Extraction completed"
        );

        let output = self.normalize(extractor.diagram_type(), extraction)?;
        for warning in &output.warnings {
            warn!(%warning, "Build warning");
        }
        info!(
            elements = output.model.elements().len(),
            relations = output.model.relations().len(),
            warnings = output.warnings.len(),
            "Model built"
        );
        Ok(output)
    }

    /// Turn raw extraction output into a valid model, dropping and
    /// reporting whatever breaks an invariant
    pub fn normalize(
        &self,
        diagram_type: DiagramType,
        extraction: Extraction,
    ) -> Result<BuildOutput, PipelineError> {
        let mut model = EntityModel::new(diagram_type).with_metadata(self.metadata.clone());
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for element in extraction.elements {
            if let Some(mut element) =
                normalize_element(diagram_type, element, &mut seen, &mut warnings)
            {
                if let Some(package) = element.parent.take() {
                    match model.element(&package) {
                        Some(p) if p.kind == ElementKind::Package => element.parent = Some(package),
                        _ => warnings.push(BuildWarning::UnknownPackage {
                            id: element.id.clone(),
                            package,
                        }),
                    }
                }
                model.add_element(element)?;
            }
        }
        warnings.extend(extraction.warnings);

        if model.elements().is_empty() {
            return Err(PipelineError::build(format!(
                "no {} diagram elements found in the text",
                diagram_type
            )));
        }

        for relation in extraction.relations {
            let relation = normalize_relation(relation);
            if diagram_type.connector(relation.kind).is_none() {
                warnings.push(BuildWarning::IllegalRelation {
                    from_id: relation.from_id,
                    to_id: relation.to_id,
                    kind: relation.kind,
                    diagram_type,
                });
                continue;
            }
            let missing = [&relation.from_id, &relation.to_id]
                .into_iter()
                .find(|id| model.element(id).is_none())
                .cloned();
            if let Some(missing) = missing {
                warnings.push(BuildWarning::DanglingRelation {
                    from_id: relation.from_id,
                    to_id: relation.to_id,
                    missing,
                });
                continue;
            }
            let package = [&relation.from_id, &relation.to_id]
                .into_iter()
                .find(|id| model.element(id).map(|e| e.kind) == Some(ElementKind::Package))
                .cloned();
            if let Some(package) = package {
                warnings.push(BuildWarning::PackageRelation {
                    from_id: relation.from_id,
                    to_id: relation.to_id,
                    package,
                });
                continue;
            }
            if !model.relations().contains(&relation) {
                model.add_relation(relation)?;
            }
        }

        Ok(BuildOutput { model, warnings })
    }
}

impl Default for JsonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_element(
    diagram_type: DiagramType,
    mut element: Element,
    seen: &mut HashSet<String>,
    warnings: &mut Vec<BuildWarning>,
) -> Option<Element> {
    element.id = single_line(&element.id);
    element.name = single_line(&element.name);
    element.stereotype = element.stereotype.as_deref().map(single_line);
    if element.business && !(diagram_type == DiagramType::UseCase && element.kind.has_business_form()) {
        element.business = false;
    }
    if element.id.is_empty() || element.name.is_empty() {
        warnings.push(BuildWarning::UnnamedElement { id: element.id });
        return None;
    }
    if !diagram_type.allows_element(element.kind) {
        warnings.push(BuildWarning::IllegalElement {
            id: element.id,
            kind: element.kind,
            diagram_type,
        });
        return None;
    }
    if seen.contains(&element.id) {
        warnings.push(BuildWarning::DuplicateElement { id: element.id });
        return None;
    }

    for attribute in &mut element.attributes {
        attribute.name = single_line(&attribute.name);
        attribute.attr_type = single_line(&attribute.attr_type);
    }
    for method in &mut element.methods {
        method.name = single_line(&method.name);
        method.return_type = single_line(&method.return_type);
        for param in &mut method.params {
            param.name = single_line(&param.name);
            param.param_type = single_line(&param.param_type);
        }
    }

    let before = element.member_count();
    if element.kind.holds_members() {
        element.attributes.retain(|a| !a.name.trim().is_empty());
        element.methods.retain(|m| !m.name.trim().is_empty());
    } else {
        element.attributes.clear();
        element.methods.clear();
    }
    let dropped = before - element.member_count();
    if dropped > 0 {
        warnings.push(BuildWarning::DroppedMembers {
            id: element.id.clone(),
            count: dropped,
        });
    }

    seen.insert(element.id.clone());
    Some(element)
}

fn normalize_relation(mut relation: Relation) -> Relation {
    relation.from_id = single_line(&relation.from_id);
    relation.to_id = single_line(&relation.to_id);
    relation.label = relation.label.as_deref().map(single_line);
    relation.multiplicity_from = relation.multiplicity_from.as_deref().map(single_line);
    relation.multiplicity_to = relation.multiplicity_to.as_deref().map(single_line);
    relation
}

/// Collapse every whitespace run, line breaks included, into one space
fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attribute, ElementKind, Method, Relation, RelationKind};

    fn class(id: &str) -> Element {
        Element::new(id, ElementKind::Class, id)
    }

    #[test]
    fn test_usuario_block() {
        let output = JsonBuilder::new()
            .build(
                "Usuario: atributos: id, nombre; métodos: crear()",
                DiagramType::Class,
                &RequestContext::new(),
            )
            .unwrap();
        let model = &output.model;
        assert_eq!(model.elements().len(), 1);
        let usuario = &model.elements()[0];
        assert_eq!(usuario.name, "Usuario");
        let attributes: Vec<_> = usuario.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attributes, vec!["id", "nombre"]);
        let methods: Vec<_> = usuario.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["crear"]);
        assert!(model.relations().is_empty());
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_nothing_extracted_is_build_error() {
        let err = JsonBuilder::new()
            .build("hola a todos", DiagramType::Class, &RequestContext::new())
            .unwrap_err();
        assert!(matches!(err, PipelineError::Build { .. }));
        assert_eq!(err.code(), 422);
    }

    #[test]
    fn test_duplicates_dropped_with_warning() {
        let mut extraction = Extraction::new();
        extraction.push_element(class("A").with_attribute(Attribute::new("x", "int")));
        extraction.push_element(class("A"));
        let output = JsonBuilder::new()
            .normalize(DiagramType::Class, extraction)
            .unwrap();
        assert_eq!(output.model.elements().len(), 1);
        assert_eq!(output.model.elements()[0].attributes.len(), 1);
        assert_eq!(
            output.warnings,
            vec![BuildWarning::DuplicateElement { id: "A".into() }]
        );
    }

    #[test]
    fn test_dangling_relation_dropped_never_fabricated() {
        let mut extraction = Extraction::new();
        extraction.push_element(class("Car"));
        extraction.push_relation(Relation::new("Car", "Engine", RelationKind::Composition));
        let output = JsonBuilder::new()
            .normalize(DiagramType::Class, extraction)
            .unwrap();
        assert_eq!(output.model.elements().len(), 1);
        assert!(output.model.relations().is_empty());
        assert_eq!(
            output.warnings,
            vec![BuildWarning::DanglingRelation {
                from_id: "Car".into(),
                to_id: "Engine".into(),
                missing: "Engine".into(),
            }]
        );
    }

    #[test]
    fn test_illegal_relation_kind_dropped() {
        let mut extraction = Extraction::new();
        extraction.push_element(Element::new("a", ElementKind::Participant, "A"));
        extraction.push_element(Element::new("b", ElementKind::Participant, "B"));
        extraction.push_relation(Relation::new("a", "b", RelationKind::Inheritance));
        let output = JsonBuilder::new()
            .normalize(DiagramType::Sequence, extraction)
            .unwrap();
        assert!(output.model.relations().is_empty());
        assert!(matches!(
            output.warnings[0],
            BuildWarning::IllegalRelation {
                kind: RelationKind::Inheritance,
                ..
            }
        ));
    }

    #[test]
    fn test_illegal_element_and_members_dropped() {
        let mut extraction = Extraction::new();
        extraction.push_element(
            Element::new("cliente", ElementKind::Actor, "Cliente").with_method(Method::new("pagar")),
        );
        extraction.push_element(class("Pedido"));
        let output = JsonBuilder::new()
            .normalize(DiagramType::UseCase, extraction)
            .unwrap();
        assert_eq!(output.model.elements().len(), 1);
        assert_eq!(output.model.elements()[0].member_count(), 0);
        assert_eq!(
            output.warnings,
            vec![
                BuildWarning::DroppedMembers {
                    id: "cliente".into(),
                    count: 1
                },
                BuildWarning::IllegalElement {
                    id: "Pedido".into(),
                    kind: ElementKind::Class,
                    diagram_type: DiagramType::UseCase,
                },
            ]
        );
    }

    #[test]
    fn test_repeated_relation_kept_once() {
        let mut extraction = Extraction::new();
        extraction.push_element(class("A"));
        extraction.push_element(class("B"));
        extraction.push_relation(Relation::new("A", "B", RelationKind::Dependency));
        extraction.push_relation(Relation::new("A", "B", RelationKind::Dependency));
        let output = JsonBuilder::new()
            .normalize(DiagramType::Class, extraction)
            .unwrap();
        assert_eq!(output.model.relations().len(), 1);
    }

    #[test]
    fn test_metadata_is_attached() {
        let metadata = Metadata {
            user_id: "u-1".into(),
            created_at: None,
            diagram_name: "demo".into(),
        };
        let output = JsonBuilder::with_metadata(metadata.clone())
            .build("clase Usuario", DiagramType::Class, &RequestContext::new())
            .unwrap();
        assert_eq!(output.model.metadata(), &metadata);
    }

    #[test]
    fn test_build_is_deterministic() {
        let text = "clases Persona, Alumno y Profesor. Alumno hereda de Persona";
        let builder = JsonBuilder::new();
        let first = builder.build(text, DiagramType::Class, &RequestContext::new()).unwrap();
        let second = builder.build(text, DiagramType::Class, &RequestContext::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_line_breaks_collapsed() {
        let mut extraction = Extraction::new();
        extraction.push_element(
            Element::new("A", ElementKind::Class, "Order\n@enduml")
                .with_attribute(Attribute::new("total", "Decimal\r\nclass X")),
        );
        extraction.push_element(class("B"));
        extraction.push_relation(Relation::new("A", "B", RelationKind::Association).with_label("has\nmany"));
        let output = JsonBuilder::new()
            .normalize(DiagramType::Class, extraction)
            .unwrap();
        let order = &output.model.elements()[0];
        assert_eq!(order.name, "Order @enduml");
        assert_eq!(order.attributes[0].attr_type, "Decimal class X");
        assert_eq!(output.model.relations()[0].label.as_deref(), Some("has many"));
        assert!(output.model.validate().is_ok());
    }

    #[test]
    fn test_unknown_package_and_package_relations() {
        let mut extraction = Extraction::new();
        extraction.push_element(Element::new("ventas", ElementKind::Package, "Ventas"));
        extraction.push_element(Element::new("cliente", ElementKind::Actor, "Cliente").business());
        extraction.push_element(Element::new("pagar", ElementKind::UseCase, "Pagar").in_package("ventas"));
        extraction.push_element(Element::new("enviar", ElementKind::UseCase, "Enviar").in_package("logistica"));
        extraction.push_relation(Relation::new("cliente", "ventas", RelationKind::Association));
        extraction.push_relation(Relation::new("cliente", "pagar", RelationKind::Association));
        let output = JsonBuilder::new()
            .normalize(DiagramType::UseCase, extraction)
            .unwrap();
        let model = &output.model;
        assert_eq!(model.element("pagar").unwrap().parent.as_deref(), Some("ventas"));
        assert_eq!(model.element("enviar").unwrap().parent, None);
        assert!(model.element("cliente").unwrap().business);
        assert_eq!(model.relations().len(), 1);
        assert_eq!(
            output.warnings,
            vec![
                BuildWarning::UnknownPackage {
                    id: "enviar".into(),
                    package: "logistica".into(),
                },
                BuildWarning::PackageRelation {
                    from_id: "cliente".into(),
                    to_id: "ventas".into(),
                    package: "ventas".into(),
                },
            ]
        );
    }
}
