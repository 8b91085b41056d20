//! Class diagram detector
//!
//! Recognises descriptions of classes, their members and relationships.

use once_cell::sync::Lazy;

use crate::core::{confidence_from_score, DiagramType, Detector, KeywordPatterns, KeywordScore};

static PATTERNS: Lazy<KeywordPatterns> = Lazy::new(|| {
    KeywordPatterns::compile(
        &[
            r"\b(clases?|atributos?|métodos?|metodos?|propiedad(es)?|herencia|hereda|implementación)\b",
            r"\b(interface|interfaz|enum|abstract[oa]|encapsulamiento|polimorfismo)\b",
            r"\b(públic[oa]s?|privad[oa]s?|protegid[oa]s?|composición|agregación|asociación)\b",
            r"\b(objetos?|instancias?|constructor|getter|setter|static|final)\b",
            r"\b(class(es)?|attributes?|methods?|inherits?|inheritance|abstract|polymorphism|composition|aggregation)\b",
        ],
        &[
            r"\b(entidad(es)?|modelo|dominio|estructura|contrato|paquete)\b",
            r"\b(extends|implementa|relación|multiplicidad|visibilidad)\b",
            r"\b(entity|entities|domain|model|implements|multiplicity|visibility)\b",
        ],
    )
    .expect("class keyword patterns")
});

/// Detector for class diagram descriptions
pub struct ClassDetector;

impl ClassDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClassDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ClassDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        confidence_from_score(self.score(input))
    }

    fn score(&self, input: &str) -> KeywordScore {
        PATTERNS.score(&input.to_lowercase())
    }

    fn diagram_type(&self) -> DiagramType {
        DiagramType::Class
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["clase", "atributos", "métodos", "hereda de", "class", "inherits from"]
    }
}
