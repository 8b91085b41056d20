//! Parsing of raw delegate answers

use serde::Deserialize;

use crate::core::DiagramType;

/// Asked when the delegate neither decides nor supplies a question
pub const DEFAULT_QUESTION: &str = "¿Puedes especificar qué diagrama quieres: clases, casos de uso, \
secuencia, actividad o componentes?";

/// What a delegate answered, before vocabulary validation
#[derive(Debug, Clone, PartialEq)]
pub enum DelegateAnswer {
    Resolved {
        label: String,
        confidence: Option<f64>,
        rationale: Option<String>,
    },
    Clarify {
        question: String,
    },
}

#[derive(Deserialize)]
struct RawAnswer {
    resolved: Option<bool>,
    #[serde(alias = "label", alias = "intent")]
    diagram_type: Option<String>,
    confidence: Option<f64>,
    #[serde(alias = "reason")]
    rationale: Option<String>,
    question: Option<String>,
}

pub fn parse_answer(raw: &str) -> DelegateAnswer {
    if let Some(json) = extract_json_object(raw) {
        if let Ok(answer) = serde_json::from_str::<RawAnswer>(json) {
            let resolved = answer.resolved.unwrap_or(answer.diagram_type.is_some());
            return match answer.diagram_type {
                Some(label) if resolved && !label.trim().is_empty() => DelegateAnswer::Resolved {
                    label,
                    confidence: answer.confidence.map(|c| c.clamp(0.0, 1.0)),
                    rationale: answer.rationale,
                },
                _ => clarify(answer.question),
            };
        }
    }

    // Some models answer with the bare label
    let bare = raw.trim();
    if !bare.is_empty() && (DiagramType::from_label(bare).is_some() || !bare.contains(char::is_whitespace)) {
        return DelegateAnswer::Resolved {
            label: bare.to_string(),
            confidence: None,
            rationale: None,
        };
    }
    clarify(None)
}

fn clarify(question: Option<String>) -> DelegateAnswer {
    let question = question
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| DEFAULT_QUESTION.to_string());
    DelegateAnswer::Clarify { question }
}

/// Outermost `{ ... }` span of the raw output
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}
