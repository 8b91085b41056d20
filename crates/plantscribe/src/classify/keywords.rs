//! Rule-based diagram type classification
//!
//! Scores every registered [`Detector`] on the same text and picks a type
//! only when one clearly dominates. Also filters everyday phrases that
//! merely share UML vocabulary ("clase de yoga", "sistema solar").

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::core::{DiagramType, Detector};
use crate::plugins::detectors;

/// Shortest trimmed text the keyword rules will decide on
pub const MIN_TEXT_CHARS: usize = 10;

static FALSE_POSITIVES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bclases? de (yoga|baile|inglés|ingles|conducción|natación)\b",
        r"\bsistema (solar|nervioso|operativo|digestivo|endocrino)\b",
        r"\bactor(es)? de (cine|teatro|televisión|doblaje)\b",
        r"\bmétodos? (científico|de estudio|de enseñanza|de aprendizaje)\b",
        r"\b(yoga|dance|cooking) class(es)?\b",
        r"\bsolar system\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("false positive pattern"))
    .collect()
});

/// Outcome label of the keyword rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordLabel {
    Diagram(DiagramType),
    /// Shares vocabulary with UML but is about something else
    NotADiagram,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordVerdict {
    pub label: KeywordLabel,
    pub confidence: f64,
    pub reason: &'static str,
}

impl KeywordVerdict {
    fn new(label: KeywordLabel, confidence: f64, reason: &'static str) -> Self {
        Self {
            label,
            confidence,
            reason,
        }
    }

    pub fn diagram_type(&self) -> Option<DiagramType> {
        match self.label {
            KeywordLabel::Diagram(diagram_type) => Some(diagram_type),
            _ => None,
        }
    }
}

/// All keyword detectors, compared against each other
pub struct DetectorSet {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorSet {
    pub fn new() -> Self {
        Self::with_detectors(detectors())
    }

    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>) -> Self {
        Self { detectors }
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn classify(&self, text: &str) -> KeywordVerdict {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_TEXT_CHARS {
            return KeywordVerdict::new(KeywordLabel::Unknown, 0.0, "text_too_short");
        }

        let lowered = trimmed.to_lowercase();
        if FALSE_POSITIVES.iter().any(|p| p.is_match(&lowered)) {
            return KeywordVerdict::new(KeywordLabel::NotADiagram, 0.95, "false_positive_filter");
        }

        let mut scores: Vec<(DiagramType, usize, usize)> = self
            .detectors
            .iter()
            .map(|d| {
                let score = d.score(&lowered);
                trace!(diagram_type = %d.diagram_type(), high = score.high, medium = score.medium, "Keyword score");
                (d.diagram_type(), score.high, score.total())
            })
            .collect();

        let with_high: Vec<DiagramType> = scores
            .iter()
            .filter(|(_, high, _)| *high > 0)
            .map(|(t, _, _)| *t)
            .collect();
        if let [only] = with_high.as_slice() {
            debug!(diagram_type = %only, "Exclusive high priority keywords");
            return KeywordVerdict::new(KeywordLabel::Diagram(*only), 0.9, "high_priority_terms");
        }

        // Stable sort keeps vocabulary order among equal totals
        scores.sort_by(|a, b| b.2.cmp(&a.2));
        let (best_type, _, best) = scores.first().copied().unwrap_or((DiagramType::Class, 0, 0));
        let second = scores.get(1).map(|(_, _, total)| *total).unwrap_or(0);

        if best >= second + 2 {
            let confidence = (0.6 + best as f64 * 0.1).min(0.9);
            KeywordVerdict::new(KeywordLabel::Diagram(best_type), confidence, "weighted_scoring")
        } else if best > second {
            KeywordVerdict::new(KeywordLabel::Diagram(best_type), 0.6, "tie_breaker")
        } else {
            KeywordVerdict::new(KeywordLabel::Unknown, 0.5, "ambiguous")
        }
    }
}

impl Default for DetectorSet {
    fn default() -> Self {
        Self::new()
    }
}
