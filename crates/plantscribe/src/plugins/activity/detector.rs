//! Activity diagram detector

use once_cell::sync::Lazy;

use crate::core::{confidence_from_score, DiagramType, Detector, KeywordPatterns, KeywordScore};

static PATTERNS: Lazy<KeywordPatterns> = Lazy::new(|| {
    KeywordPatterns::compile(
        &[
            r"\b(actividad(es)?|pasos|flujo de trabajo|flujo|proceso)\b",
            r"\b(activity|activities|steps|workflow|flow ?chart|process)\b",
        ],
        &[
            r"\b(primero|luego|después|despues|finalmente|decisión|si no)\b",
            r"\b(first|then|next|finally|decision|otherwise)\b",
        ],
    )
    .expect("activity keyword patterns")
});

/// Detector for activity diagram descriptions
pub struct ActivityDetector;

impl ActivityDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ActivityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ActivityDetector {
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
        DiagramType::Activity
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["pasos", "flujo", "actividad", "steps", "workflow"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_activity_flows() {
        let detector = ActivityDetector::new();
        assert!(detector.detect("el proceso de compra tiene estos pasos: elegir, pagar"));
        assert!(detector.detect("workflow: first login, then checkout"));
        assert!(!detector.detect("una clase Usuario"));
    }

    #[test]
    fn test_medium_words_alone_stay_low() {
        let detector = ActivityDetector::new();
        let confidence = detector.confidence("primero esto y luego aquello");
        assert!(confidence > 0.0 && confidence <= 0.6);
    }
}
