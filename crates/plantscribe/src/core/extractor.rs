//! Core extractor trait for turning text into raw diagram entities
//!
//! Extractors are per diagram type and best effort: their output is not
//! yet checked against model invariants. The builder normalises it.

use super::context::RequestContext;
use super::error::BuildWarning;
use super::model::{Element, Relation};
use super::types::DiagramType;

/// Unvalidated entities pulled out of a description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub elements: Vec<Element>,
    pub relations: Vec<Relation>,
    /// Text the extractor recognised but could not turn into entities
    pub warnings: Vec<BuildWarning>,
}

impl Extraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Push an element unless one with the same id is already present
    pub fn ensure(&mut self, element: Element) -> &mut Element {
        let index = match self.elements.iter().position(|e| e.id == element.id) {
            Some(index) => index,
            None => {
                self.elements.push(element);
                self.elements.len() - 1
            }
        };
        &mut self.elements[index]
    }

    pub fn push_element(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn push_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    pub fn warn(&mut self, warning: BuildWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}

/// Core trait for text extractors
///
/// Given the same text and context an extractor must return the same
/// extraction.
pub trait Extractor: Send + Sync {
    /// Pull elements and relations out of `text`
    fn extract(&self, text: &str, context: &RequestContext) -> Extraction;

    /// The diagram type this extractor produces
    fn diagram_type(&self) -> DiagramType;

    /// Get the name of this extractor
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ElementKind;

    #[test]
    fn test_ensure_does_not_duplicate() {
        let mut extraction = Extraction::new();
        extraction.ensure(Element::new("A", ElementKind::Class, "A"));
        extraction
            .ensure(Element::new("A", ElementKind::Interface, "Other"))
            .name = "Renamed".to_string();
        assert_eq!(extraction.elements.len(), 1);
        assert_eq!(extraction.elements[0].name, "Renamed");
        assert_eq!(extraction.elements[0].kind, ElementKind::Class);
    }
}
