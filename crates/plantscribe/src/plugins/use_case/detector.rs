//! Use case diagram detector

use once_cell::sync::Lazy;

use crate::core::{confidence_from_score, DiagramType, Detector, KeywordPatterns, KeywordScore};

static PATTERNS: Lazy<KeywordPatterns> = Lazy::new(|| {
    KeywordPatterns::compile(
        &[
            r"\b(actor(es)?|usuarios?|sistema|funcionalidad(es)?|casos? de uso)\b",
            r"\b(interactúan?|realiza|ejecuta|escenarios?|requisitos?|requerimientos?)\b",
            r"\b(rol(es)?|objetivos?|autenticación|registro|login|inicio de sesión)\b",
            r"\b(actors?|use cases?|users?|interacts?|scenarios?|requirements?|sign in)\b",
        ],
        &[
            r"\b(clientes?|administrador(es)?|gestión|proceso|permisos?|acceso|restricción|nivel|privilegios?)\b",
            r"\b(customers?|admins?|administrators?|permissions?|access|roles?)\b",
        ],
    )
    .expect("use case keyword patterns")
});

/// Detector for use case diagram descriptions
pub struct UseCaseDetector;

impl UseCaseDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UseCaseDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for UseCaseDetector {
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
        DiagramType::UseCase
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["actor", "caso de uso", "puede", "use case", "can"]
    }
}
