//! Diagram type classification
//!
//! [`DiagramClassifier`] maps a description (plus optional conversation
//! context) to exactly one [`DiagramType`]. The decision itself comes from
//! a [`ClassificationDelegate`]; the classifier bounds every call with a
//! timeout, retries a transient failure once, and validates the answer
//! against the fixed label vocabulary.

mod delegate;
mod keywords;
mod llm;
mod parse;
mod prompt;

pub use delegate::{ClassificationDelegate, DelegateError, KeywordDelegate};
pub use keywords::{DetectorSet, KeywordLabel, KeywordVerdict, MIN_TEXT_CHARS};
pub use llm::LlmDelegate;
pub use parse::{parse_answer, DelegateAnswer, DEFAULT_QUESTION};
pub use prompt::{build_prompt, description_of, SYSTEM_PROMPT};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, warn, Instrument, Level};

use crate::core::{ClassifierConfig, DiagramType, PipelineError, RequestContext, Strategy};

/// Total delegate attempts: the first call plus one retry
pub const MAX_ATTEMPTS: u32 = 2;

/// Confidence given to a resolved answer that did not state one
pub const DEFAULT_DELEGATE_CONFIDENCE: f64 = 0.8;

const REINFORCE_THRESHOLD: f64 = 0.6;
const REINFORCE_STEP: f64 = 0.1;
const REINFORCE_CAP: f64 = 0.95;

/// Label reported when the delegate asked a question instead of deciding
pub const UNRESOLVED_LABEL: &str = "unresolved";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub intent: DiagramType,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

pub struct DiagramClassifier {
    config: ClassifierConfig,
    delegate: Arc<dyn ClassificationDelegate>,
    detectors: DetectorSet,
}

impl DiagramClassifier {
    pub fn new(config: ClassifierConfig, delegate: Arc<dyn ClassificationDelegate>) -> Self {
        Self {
            config,
            delegate,
            detectors: DetectorSet::new(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn delegate_name(&self) -> &'static str {
        self.delegate.name()
    }

    pub async fn classify(
        &self,
        text: &str,
        context: &RequestContext,
    ) -> Result<Classification, PipelineError> {
        let classify_span = span!(Level::INFO, "classify", input_len = text.len());
        self.classify_inner(text, context)
            .instrument(classify_span)
            .await
    }

    async fn classify_inner(
        &self,
        text: &str,
        context: &RequestContext,
    ) -> Result<Classification, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::invalid_input("text is empty"));
        }

        if self.config.strategy == Strategy::KeywordsFirst {
            let verdict = self.detectors.classify(text);
            debug!(label = ?verdict.label, confidence = verdict.confidence, reason = verdict.reason, "Keyword verdict");
            if verdict.confidence >= self.config.fallback_confidence {
                match verdict.label {
                    KeywordLabel::Diagram(intent) => {
                        return Ok(self.reinforce(
                            Classification {
                                intent,
                                confidence: verdict.confidence,
                                rationale: Some(verdict.reason.to_string()),
                            },
                            context,
                        ));
                    }
                    KeywordLabel::NotADiagram => {
                        return Err(PipelineError::unclassifiable("other", None));
                    }
                    KeywordLabel::Unknown => {}
                }
            }
            debug!("Keyword confidence too low, asking delegate");
        }

        let prompt = build_prompt(text, context, self.config.history_limit);
        let raw = self.call_delegate(&prompt).await?;

        let classification = match parse_answer(&raw) {
            DelegateAnswer::Clarify { question } => {
                info!(%question, "Delegate asked for clarification");
                return Err(PipelineError::unclassifiable(UNRESOLVED_LABEL, Some(question)));
            }
            DelegateAnswer::Resolved {
                label,
                confidence,
                rationale,
            } => {
                let intent = DiagramType::from_label(&label).ok_or_else(|| {
                    warn!(%label, "Delegate answered outside the label vocabulary");
                    PipelineError::unclassifiable(label.trim(), None)
                })?;
                Classification {
                    intent,
                    confidence: confidence.unwrap_or(DEFAULT_DELEGATE_CONFIDENCE),
                    rationale,
                }
            }
        };

        let classification = self.reinforce(classification, context);
        info!(
            intent = %classification.intent,
            confidence = classification.confidence,
            delegate = self.delegate.name(),
            "Classified text"
        );
        Ok(classification)
    }

    /// Bounded delegate call with a single retry on transient failure
    async fn call_delegate(&self, prompt: &str) -> Result<String, PipelineError> {
        let timeout = self.config.timeout();
        let mut last_failure = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            match tokio::time::timeout(timeout, self.delegate.call(prompt)).await {
                Ok(Ok(raw)) => {
                    debug!(attempt, answer_len = raw.len(), "Delegate answered");
                    return Ok(raw);
                }
                Ok(Err(DelegateError::Fatal(message))) => {
                    warn!(attempt, %message, "Fatal delegate failure");
                    return Err(PipelineError::config(format!(
                        "classification delegate {}: {}",
                        self.delegate.name(),
                        message
                    )));
                }
                Ok(Err(DelegateError::Transient(message))) => {
                    warn!(attempt, %message, "Transient delegate failure");
                    last_failure = message;
                }
                Err(_) => {
                    warn!(attempt, timeout_ms = self.config.timeout_ms, "Delegate timed out");
                    last_failure = format!("delegate timed out after {} ms", self.config.timeout_ms);
                }
            }
        }

        Err(PipelineError::classification_unavailable(
            last_failure,
            MAX_ATTEMPTS,
        ))
    }

    /// Nudge confidence up when the conversation stays on the same type
    fn reinforce(&self, mut classification: Classification, context: &RequestContext) -> Classification {
        if context.last_intent() == Some(classification.intent)
            && classification.confidence > REINFORCE_THRESHOLD
        {
            classification.confidence = (classification.confidence + REINFORCE_STEP).min(REINFORCE_CAP);
            debug!(confidence = classification.confidence, "Reinforced by conversation history");
        }
        classification
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HistoryEntry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned results in order, repeating the last one
    struct ScriptedDelegate {
        script: Mutex<Vec<Result<String, DelegateError>>>,
        calls: AtomicU32,
    }

    impl ScriptedDelegate {
        fn new(script: Vec<Result<String, DelegateError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicU32::new(0),
            })
        }

        fn answering(raw: &str) -> Arc<Self> {
            Self::new(vec![Ok(raw.to_string())])
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClassificationDelegate for ScriptedDelegate {
        async fn call(&self, _prompt: &str) -> Result<String, DelegateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct SlowDelegate;

    #[async_trait]
    impl ClassificationDelegate for SlowDelegate {
        async fn call(&self, _prompt: &str) -> Result<String, DelegateError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(r#"{"diagram_type": "class"}"#.to_string())
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn classifier(delegate: Arc<dyn ClassificationDelegate>) -> DiagramClassifier {
        DiagramClassifier::new(ClassifierConfig::default(), delegate)
    }

    #[tokio::test]
    async fn test_empty_text_is_invalid_input() {
        let delegate = ScriptedDelegate::answering(r#"{"diagram_type": "class"}"#);
        let err = classifier(delegate.clone())
            .classify("   \n", &RequestContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
        assert_eq!(delegate.calls(), 0);
    }

    #[tokio::test]
    async fn test_resolved_answer() {
        let delegate = ScriptedDelegate::answering(
            r#"{"resolved": true, "diagram_type": "sequence", "confidence": 0.7, "rationale": "messages"}"#,
        );
        let result = classifier(delegate)
            .classify("el cliente envía un pedido al servidor", &RequestContext::new())
            .await
            .unwrap();
        assert_eq!(result.intent, DiagramType::Sequence);
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.rationale.as_deref(), Some("messages"));
    }

    #[tokio::test]
    async fn test_missing_confidence_defaults() {
        let delegate = ScriptedDelegate::answering(r#"{"diagram_type": "diagrama_clases"}"#);
        let result = classifier(delegate)
            .classify("clase Usuario", &RequestContext::new())
            .await
            .unwrap();
        assert_eq!(result.intent, DiagramType::Class);
        assert_eq!(result.confidence, DEFAULT_DELEGATE_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_label_outside_vocabulary() {
        let delegate = ScriptedDelegate::answering(r#"{"diagram_type": "gantt"}"#);
        let err = classifier(delegate)
            .classify("plan de proyecto por semanas", &RequestContext::new())
            .await
            .unwrap_err();
        match err {
            PipelineError::Unclassifiable {
                label,
                clarification,
            } => {
                assert_eq!(label, "gantt");
                assert!(clarification.is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_clarification_question_is_attached() {
        let delegate = ScriptedDelegate::answering(
            r#"{"resolved": false, "question": "¿Entidades o actores?"}"#,
        );
        let err = classifier(delegate)
            .classify("sistema con usuarios y permisos", &RequestContext::new())
            .await
            .unwrap_err();
        match err {
            PipelineError::Unclassifiable { clarification, .. } => {
                assert_eq!(clarification.as_deref(), Some("¿Entidades o actores?"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_single_retry_on_transient_failure() {
        let delegate = ScriptedDelegate::new(vec![
            Err(DelegateError::Transient("503".into())),
            Ok(r#"{"diagram_type": "activity"}"#.into()),
        ]);
        let result = classifier(delegate.clone())
            .classify("pasos: abrir, leer, cerrar", &RequestContext::new())
            .await
            .unwrap();
        assert_eq!(result.intent, DiagramType::Activity);
        assert_eq!(delegate.calls(), 2);
    }

    #[tokio::test]
    async fn test_two_transient_failures_are_unavailable() {
        let delegate = ScriptedDelegate::new(vec![Err(DelegateError::Transient("503".into()))]);
        let err = classifier(delegate.clone())
            .classify("pasos: abrir, leer, cerrar", &RequestContext::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ClassificationUnavailable { attempts: 2, .. }
        ));
        assert_eq!(err.code(), 503);
        assert_eq!(delegate.calls(), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_is_not_retried() {
        let delegate = ScriptedDelegate::new(vec![Err(DelegateError::Fatal("no key".into()))]);
        let err = classifier(delegate.clone())
            .classify("pasos: abrir, leer, cerrar", &RequestContext::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
        assert_eq!(delegate.calls(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let config = ClassifierConfig {
            timeout_ms: 50,
            ..ClassifierConfig::default()
        };
        let err = DiagramClassifier::new(config, Arc::new(SlowDelegate))
            .classify("clase Usuario con atributos", &RequestContext::new())
            .await
            .unwrap_err();
        match err {
            PipelineError::ClassificationUnavailable { message, attempts } => {
                assert_eq!(attempts, 2);
                assert!(message.contains("timed out"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_history_reinforces_same_intent() {
        let delegate = ScriptedDelegate::answering(r#"{"diagram_type": "class", "confidence": 0.9}"#);
        let context = RequestContext::new()
            .with_history(HistoryEntry::classified("clase Usuario", DiagramType::Class));
        let result = classifier(delegate)
            .classify("añade la clase Pedido", &context)
            .await
            .unwrap();
        assert_eq!(result.confidence, REINFORCE_CAP);
    }

    #[tokio::test]
    async fn test_history_does_not_reinforce_other_intent() {
        let delegate = ScriptedDelegate::answering(r#"{"diagram_type": "class", "confidence": 0.7}"#);
        let context = RequestContext::new()
            .with_history(HistoryEntry::classified("actor Cliente", DiagramType::UseCase));
        let result = classifier(delegate)
            .classify("añade la clase Pedido", &context)
            .await
            .unwrap();
        assert_eq!(result.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_keywords_first_skips_delegate_when_confident() {
        let delegate = ScriptedDelegate::answering(r#"{"diagram_type": "sequence"}"#);
        let config = ClassifierConfig {
            strategy: Strategy::KeywordsFirst,
            ..ClassifierConfig::default()
        };
        let result = DiagramClassifier::new(config, delegate.clone())
            .classify(
                "quiero un diagrama de clases con atributos y métodos privados",
                &RequestContext::new(),
            )
            .await
            .unwrap();
        assert_eq!(result.intent, DiagramType::Class);
        assert_eq!(delegate.calls(), 0);
    }

    #[tokio::test]
    async fn test_keywords_first_falls_back_when_unsure() {
        let delegate = ScriptedDelegate::answering(r#"{"diagram_type": "component"}"#);
        let config = ClassifierConfig {
            strategy: Strategy::KeywordsFirst,
            ..ClassifierConfig::default()
        };
        let result = DiagramClassifier::new(config, delegate.clone())
            .classify("buenos días, ¿qué tal estás hoy?", &RequestContext::new())
            .await
            .unwrap();
        assert_eq!(result.intent, DiagramType::Component);
        assert_eq!(delegate.calls(), 1);
    }
}
