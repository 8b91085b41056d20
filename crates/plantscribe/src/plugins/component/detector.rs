//! Component diagram detector

use once_cell::sync::Lazy;

use crate::core::{confidence_from_score, DiagramType, Detector, KeywordPatterns, KeywordScore};

static PATTERNS: Lazy<KeywordPatterns> = Lazy::new(|| {
    KeywordPatterns::compile(
        &[
            r"\b(componentes?|módulos?|modulos?|microservicios?|depende de|dependencias?)\b",
            r"\b(components?|modules?|microservices?|depends on|dependenc(y|ies))\b",
        ],
        &[
            r"\b(librería|biblioteca|servicios?|arquitectura|despliegue|puertos?)\b",
            r"\b(library|services?|architecture|deployment|ports?|provides|exposes)\b",
        ],
    )
    .expect("component keyword patterns")
});

/// Detector for component diagram descriptions
pub struct ComponentDetector;

impl ComponentDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComponentDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ComponentDetector {
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
        DiagramType::Component
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["componente", "depende de", "módulo", "component", "depends on"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_components() {
        let detector = ComponentDetector::new();
        assert!(detector.detect("el componente Web depende de Api"));
        assert!(detector.detect("three microservices: Orders, Billing and Users"));
        assert_eq!(detector.confidence("hola mundo"), 0.0);
    }
}
