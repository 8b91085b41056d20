//! The canonical diagram model
//!
//! [`EntityModel`] is the JSON contract between the builder and the
//! compiler. Its diagram type is fixed at construction; elements and
//! relations keep their insertion order, which is also output order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::database::Database;
use super::error::PipelineError;
use super::types::{DiagramType, ElementKind, Modifier, RelationKind, Visibility};

/// An attribute of a class-like element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr_type: attr_type.into(),
            visibility: Visibility::Public,
            modifier: None,
        }
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = v;
        self
    }

    pub fn with_modifier(mut self, m: Modifier) -> Self {
        self.modifier = Some(m);
        self
    }
}

/// A method parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

impl Param {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
        }
    }
}

/// A method of a class-like element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    pub return_type: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

impl Method {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: "void".to_string(),
            visibility: Visibility::Public,
            modifier: None,
        }
    }

    pub fn with_param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = return_type.into();
        self
    }

    pub fn with_visibility(mut self, v: Visibility) -> Self {
        self.visibility = v;
        self
    }

    pub fn with_modifier(mut self, m: Modifier) -> Self {
        self.modifier = Some(m);
        self
    }
}

/// A node of the diagram: class, actor, participant, ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub kind: ElementKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stereotype: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub methods: Vec<Method>,
    /// Id of the enclosing package, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Business actor or use case
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub business: bool,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: ElementKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            stereotype: None,
            attributes: Vec::new(),
            methods: Vec::new(),
            parent: None,
            business: false,
        }
    }

    pub fn with_stereotype(mut self, stereotype: impl Into<String>) -> Self {
        self.stereotype = Some(stereotype.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn in_package(mut self, package_id: impl Into<String>) -> Self {
        self.parent = Some(package_id.into());
        self
    }

    pub fn business(mut self) -> Self {
        self.business = true;
        self
    }

    pub fn member_count(&self) -> usize {
        self.attributes.len() + self.methods.len()
    }
}

/// A directed relation between two elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub from_id: String,
    pub to_id: String,
    pub kind: RelationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplicity_to: Option<String>,
}

impl Relation {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            kind,
            label: None,
            multiplicity_from: None,
            multiplicity_to: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_multiplicity(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.multiplicity_from = Some(from.into());
        self.multiplicity_to = Some(to.into());
        self
    }
}

/// Provenance only; never interpreted by the compiler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub diagram_name: String,
}

/// Canonical description of one diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityModel {
    diagram_type: DiagramType,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    relations: Vec<Relation>,
    #[serde(default)]
    metadata: Metadata,
}

impl EntityModel {
    pub fn new(diagram_type: DiagramType) -> Self {
        Self {
            diagram_type,
            elements: Vec::new(),
            relations: Vec::new(),
            metadata: Metadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Parse a model from its JSON form
    ///
    /// Malformed JSON and unknown enum values (including visibility) are
    /// schema violations. Invariants are not checked here; see [`validate`].
    ///
    /// [`validate`]: EntityModel::validate
    pub fn from_json(input: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn diagram_type(&self) -> DiagramType {
        self.diagram_type
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<&Element> {
        let lower = name.to_lowercase();
        self.elements.iter().find(|e| e.name.to_lowercase() == lower)
    }

    /// Append an element, rejecting duplicate ids and kinds the diagram
    /// type does not allow
    pub fn add_element(&mut self, element: Element) -> Result<(), PipelineError> {
        if self.element(&element.id).is_some() {
            return Err(PipelineError::schema_violation(format!(
                "duplicate element id '{}'",
                element.id
            )));
        }
        check_element(self.diagram_type, &element)?;
        if let Some(parent) = &element.parent {
            check_parent(&element.id, parent, self.element(parent).map(|p| p.kind))?;
        }
        self.elements.push(element);
        Ok(())
    }

    /// Append a relation whose endpoints and kind are already legal
    pub fn add_relation(&mut self, relation: Relation) -> Result<(), PipelineError> {
        check_relation(self.diagram_type, &relation, |id| self.element(id).map(|e| e.kind))?;
        self.relations.push(relation);
        Ok(())
    }

    /// Remove an element and every relation touching it
    ///
    /// Removing a package moves its contents into the enclosing package.
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        self.relations.retain(|r| r.from_id != id && r.to_id != id);
        let removed = self.elements.remove(index);
        for element in &mut self.elements {
            if element.parent.as_deref() == Some(id) {
                element.parent = removed.parent.clone();
            }
        }
        Some(removed)
    }

    /// Remove every relation from `from_id` to `to_id`; returns how many
    pub fn remove_relations(&mut self, from_id: &str, to_id: &str) -> usize {
        let before = self.relations.len();
        self.relations
            .retain(|r| !(r.from_id == from_id && r.to_id == to_id));
        before - self.relations.len()
    }

    /// Elements directly inside `parent`, or at top level for `None`
    pub fn children<'a>(&'a self, parent: Option<&'a str>) -> impl Iterator<Item = &'a Element> {
        self.elements
            .iter()
            .filter(move |e| e.parent.as_deref() == parent)
    }

    /// Give an element a new display name; the id is kept
    pub fn rename_element(&mut self, id: &str, name: impl Into<String>) -> Result<(), PipelineError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PipelineError::schema_violation(format!(
                "element '{}' needs a non-empty name",
                id
            )));
        }
        check_line(&name, || format!("name of element '{}'", id))?;
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| PipelineError::schema_violation(format!("no element with id '{}'", id)))?;
        element.name = name;
        Ok(())
    }

    pub fn add_attribute(&mut self, id: &str, attribute: Attribute) -> Result<(), PipelineError> {
        check_attribute(id, &attribute)?;
        let element = self.member_holder(id)?;
        element.attributes.push(attribute);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: &str, name: &str) -> bool {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| {
                let before = e.attributes.len();
                e.attributes.retain(|a| a.name != name);
                e.attributes.len() < before
            })
            .unwrap_or(false)
    }

    pub fn add_method(&mut self, id: &str, method: Method) -> Result<(), PipelineError> {
        check_method(id, &method)?;
        let element = self.member_holder(id)?;
        element.methods.push(method);
        Ok(())
    }

    pub fn remove_method(&mut self, id: &str, name: &str) -> bool {
        self.elements
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| {
                let before = e.methods.len();
                e.methods.retain(|m| m.name != name);
                e.methods.len() < before
            })
            .unwrap_or(false)
    }

    fn member_holder(&mut self, id: &str) -> Result<&mut Element, PipelineError> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| PipelineError::schema_violation(format!("no element with id '{}'", id)))?;
        if !element.kind.holds_members() {
            return Err(PipelineError::schema_violation(format!(
                "element '{}' of kind {} cannot hold members",
                id, element.kind
            )));
        }
        Ok(element)
    }

    /// Check every model invariant
    ///
    /// Ids are unique and non-empty, names are non-empty, element and
    /// relation kinds are legal for the diagram type, members only sit on
    /// class-like elements, every relation endpoint resolves and package
    /// nesting is acyclic. No rendered text may contain a line break.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut kinds = HashMap::new();
        for element in &self.elements {
            if element.id.trim().is_empty() {
                return Err(PipelineError::schema_violation("element with empty id"));
            }
            if kinds.insert(element.id.as_str(), element.kind).is_some() {
                return Err(PipelineError::schema_violation(format!(
                    "duplicate element id '{}'",
                    element.id
                )));
            }
            check_element(self.diagram_type, element)?;
        }

        for element in &self.elements {
            if let Some(parent) = &element.parent {
                check_parent(&element.id, parent, kinds.get(parent.as_str()).copied())?;
            }
        }
        self.check_nesting()?;

        for relation in &self.relations {
            check_relation(self.diagram_type, relation, |id| kinds.get(id).copied())?;
        }

        Ok(())
    }

    /// Every parent chain must end at a top-level element
    fn check_nesting(&self) -> Result<(), PipelineError> {
        for element in &self.elements {
            let mut current = element.parent.as_deref();
            let mut depth = 0;
            while let Some(parent) = current {
                depth += 1;
                if depth > self.elements.len() {
                    return Err(PipelineError::schema_violation(format!(
                        "package nesting of '{}' is cyclic",
                        element.id
                    )));
                }
                current = self.element(parent).and_then(|p| p.parent.as_deref());
            }
        }
        Ok(())
    }
}

/// PlantUML is line oriented; a line break would end the statement early
fn check_line(value: &str, field: impl FnOnce() -> String) -> Result<(), PipelineError> {
    if value.contains(['\n', '\r']) {
        return Err(PipelineError::schema_violation(format!(
            "{} contains a line break",
            field()
        )));
    }
    Ok(())
}

fn check_element(diagram_type: DiagramType, element: &Element) -> Result<(), PipelineError> {
    check_line(&element.id, || format!("id '{}'", element.id.escape_debug()))?;
    if element.name.trim().is_empty() {
        return Err(PipelineError::schema_violation(format!(
            "element '{}' has an empty name",
            element.id
        )));
    }
    check_line(&element.name, || format!("name of element '{}'", element.id))?;
    if let Some(stereotype) = &element.stereotype {
        check_line(stereotype, || format!("stereotype of element '{}'", element.id))?;
    }
    if !diagram_type.allows_element(element.kind) {
        return Err(PipelineError::schema_violation(format!(
            "element '{}' of kind {} is not allowed in a {} diagram",
            element.id, element.kind, diagram_type
        )));
    }
    if element.business && !(diagram_type == DiagramType::UseCase && element.kind.has_business_form()) {
        return Err(PipelineError::schema_violation(format!(
            "element '{}' of kind {} has no business form in a {} diagram",
            element.id, element.kind, diagram_type
        )));
    }
    if !element.kind.holds_members() && element.member_count() > 0 {
        return Err(PipelineError::schema_violation(format!(
            "element '{}' of kind {} cannot hold members",
            element.id, element.kind
        )));
    }
    for attribute in &element.attributes {
        check_attribute(&element.id, attribute)?;
    }
    for method in &element.methods {
        check_method(&element.id, method)?;
    }
    Ok(())
}

fn check_attribute(id: &str, attribute: &Attribute) -> Result<(), PipelineError> {
    if attribute.name.trim().is_empty() {
        return Err(PipelineError::schema_violation(format!(
            "element '{}' has an attribute with an empty name",
            id
        )));
    }
    check_line(&attribute.name, || format!("attribute of element '{}'", id))?;
    check_line(&attribute.attr_type, || {
        format!("type of attribute '{}.{}'", id, attribute.name)
    })
}

fn check_method(id: &str, method: &Method) -> Result<(), PipelineError> {
    if method.name.trim().is_empty() {
        return Err(PipelineError::schema_violation(format!(
            "element '{}' has a method with an empty name",
            id
        )));
    }
    check_line(&method.name, || format!("method of element '{}'", id))?;
    check_line(&method.return_type, || {
        format!("return type of method '{}.{}'", id, method.name)
    })?;
    for param in &method.params {
        check_line(&param.name, || format!("parameter of method '{}.{}'", id, method.name))?;
        check_line(&param.param_type, || {
            format!("parameter type in method '{}.{}'", id, method.name)
        })?;
    }
    Ok(())
}

fn check_parent(id: &str, parent: &str, kind: Option<ElementKind>) -> Result<(), PipelineError> {
    match kind {
        Some(ElementKind::Package) => Ok(()),
        Some(kind) => Err(PipelineError::schema_violation(format!(
            "element '{}' is nested in '{}', a {} rather than a package",
            id, parent, kind
        ))),
        None => Err(PipelineError::schema_violation(format!(
            "element '{}' is nested in unknown package '{}'",
            id, parent
        ))),
    }
}

fn check_relation(
    diagram_type: DiagramType,
    relation: &Relation,
    kind_of: impl Fn(&str) -> Option<ElementKind>,
) -> Result<(), PipelineError> {
    for endpoint in [&relation.from_id, &relation.to_id] {
        match kind_of(endpoint) {
            None => {
                return Err(PipelineError::schema_violation(format!(
                    "relation {} -> {} references unknown element '{}'",
                    relation.from_id, relation.to_id, endpoint
                )))
            }
            Some(ElementKind::Package) => {
                return Err(PipelineError::schema_violation(format!(
                    "relation {} -> {} connects package '{}'",
                    relation.from_id, relation.to_id, endpoint
                )))
            }
            Some(_) => {}
        }
    }
    if diagram_type.connector(relation.kind).is_none() {
        return Err(PipelineError::schema_violation(format!(
            "{} relation {} -> {} is not allowed in a {} diagram",
            relation.kind, relation.from_id, relation.to_id, diagram_type
        )));
    }
    let text = [
        relation.label.as_deref(),
        relation.multiplicity_from.as_deref(),
        relation.multiplicity_to.as_deref(),
    ];
    for value in text.into_iter().flatten() {
        check_line(value, || {
            format!("relation {} -> {}", relation.from_id, relation.to_id)
        })?;
    }
    Ok(())
}

impl Database for EntityModel {
    type Node = Element;
    type Edge = Relation;

    fn add_node(&mut self, node: Self::Node) -> Result<(), PipelineError> {
        self.add_element(node)
    }

    fn add_edge(&mut self, edge: Self::Edge) -> Result<(), PipelineError> {
        self.add_relation(edge)
    }

    fn get_node(&self, id: &str) -> Option<&Self::Node> {
        self.element(id)
    }

    fn nodes(&self) -> impl Iterator<Item = &Self::Node> {
        self.elements.iter()
    }

    fn edges(&self) -> impl Iterator<Item = &Self::Edge> {
        self.relations.iter()
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.relations.clear();
    }

    fn node_count(&self) -> usize {
        self.elements.len()
    }

    fn edge_count(&self) -> usize {
        self.relations.len()
    }
}
