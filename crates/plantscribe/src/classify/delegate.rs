//! Classification delegates
//!
//! A delegate turns a prompt into a raw answer. The classifier owns
//! timeouts, retries and validation; delegates only report whether a
//! failure is worth retrying.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use super::keywords::{DetectorSet, KeywordLabel};
use super::parse::DEFAULT_QUESTION;
use super::prompt::description_of;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DelegateError {
    /// Network hiccups, rate limits, overloaded providers
    #[error("transient delegate failure: {0}")]
    Transient(String),

    /// Missing credentials, unknown provider, rejected request
    #[error("delegate failure: {0}")]
    Fatal(String),
}

impl DelegateError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DelegateError::Transient(_))
    }
}

#[async_trait]
pub trait ClassificationDelegate: Send + Sync {
    /// Answer a classification prompt with raw text, ideally JSON
    async fn call(&self, prompt: &str) -> Result<String, DelegateError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Offline delegate backed by the keyword detectors
///
/// Deterministic and never fails. Answers in the same JSON shape a model
/// is asked for.
pub struct KeywordDelegate {
    detectors: DetectorSet,
}

impl KeywordDelegate {
    pub fn new() -> Self {
        Self {
            detectors: DetectorSet::new(),
        }
    }
}

impl Default for KeywordDelegate {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClassificationDelegate for KeywordDelegate {
    async fn call(&self, prompt: &str) -> Result<String, DelegateError> {
        let verdict = self.detectors.classify(description_of(prompt));
        let answer = match verdict.label {
            KeywordLabel::Diagram(diagram_type) => json!({
                "resolved": true,
                "diagram_type": diagram_type.label(),
                "confidence": verdict.confidence,
                "rationale": verdict.reason,
            }),
            KeywordLabel::NotADiagram => json!({
                "resolved": true,
                "diagram_type": "other",
                "confidence": verdict.confidence,
                "rationale": verdict.reason,
            }),
            KeywordLabel::Unknown => json!({
                "resolved": false,
                "diagram_type": null,
                "question": DEFAULT_QUESTION,
                "rationale": verdict.reason,
            }),
        };
        Ok(answer.to_string())
    }

    fn name(&self) -> &'static str {
        "keywords"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::prompt::build_prompt;
    use crate::core::RequestContext;

    async fn answer(text: &str) -> serde_json::Value {
        let prompt = build_prompt(text, &RequestContext::new(), 5);
        let raw = KeywordDelegate::new().call(&prompt).await.unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_keyword_delegate_resolves_class_text() {
        let value = answer("diagrama de clases con herencia entre Usuario y Admin").await;
        assert_eq!(value["resolved"], true);
        assert_eq!(value["diagram_type"], "class");
    }

    #[tokio::test]
    async fn test_keyword_delegate_flags_everyday_text() {
        let value = answer("quiero apuntarme a una clase de yoga").await;
        assert_eq!(value["diagram_type"], "other");
    }

    #[tokio::test]
    async fn test_keyword_delegate_asks_on_short_text() {
        let value = answer("hola").await;
        assert_eq!(value["resolved"], false);
        assert_eq!(value["question"], DEFAULT_QUESTION);
    }

    #[test]
    fn test_transient_flag() {
        assert!(DelegateError::Transient("429".into()).is_transient());
        assert!(!DelegateError::Fatal("no key".into()).is_transient());
    }
}
