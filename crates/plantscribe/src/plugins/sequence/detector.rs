//! Sequence diagram detector

use once_cell::sync::Lazy;

use crate::core::{confidence_from_score, DiagramType, Detector, KeywordPatterns, KeywordScore};

static PATTERNS: Lazy<KeywordPatterns> = Lazy::new(|| {
    KeywordPatterns::compile(
        &[
            r"\b(secuencia|mensajes?|envía|envia|manda|llama|responde|contesta)\b",
            r"\b(sequence|messages?|sends?|calls?|replies|responds?|lifelines?)\b",
        ],
        &[
            r"\b(participantes?|petición|solicitud|respuesta|servidor|orden)\b",
            r"\b(participants?|request|response|server|api|returns?)\b",
        ],
    )
    .expect("sequence keyword patterns")
});

/// Detector for sequence diagram descriptions
pub struct SequenceDetector;

impl SequenceDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SequenceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for SequenceDetector {
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
        DiagramType::Sequence
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["envía", "responde", "secuencia", "sends", "replies"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_message_exchanges() {
        let detector = SequenceDetector::new();
        assert!(detector.detect("el Cliente envía una petición al Servidor y el Servidor responde"));
        assert!(detector.detect("Browser sends a request to Api"));
        assert_eq!(detector.confidence("clase Perro"), 0.0);
    }
}
