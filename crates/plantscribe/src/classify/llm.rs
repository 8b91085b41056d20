//! Model-backed classification delegate using the `llm` crate

use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use llm::error::LLMError;
use tracing::debug;

use super::delegate::{ClassificationDelegate, DelegateError};
use super::prompt::SYSTEM_PROMPT;
use crate::core::LlmConfig;

fn map_backend(provider: &str) -> Result<LLMBackend, DelegateError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(DelegateError::Fatal(format!("unknown provider: {other}"))),
    }
}

fn map_error(err: LLMError) -> DelegateError {
    match err {
        LLMError::AuthError(message) => DelegateError::Fatal(format!("authentication: {message}")),
        LLMError::InvalidRequest(message) => {
            DelegateError::Fatal(format!("invalid request: {message}"))
        }
        other => DelegateError::Transient(other.to_string()),
    }
}

/// Asks a hosted or local model, with temperature 0
pub struct LlmDelegate {
    config: LlmConfig,
}

impl LlmDelegate {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl ClassificationDelegate for LlmDelegate {
    async fn call(&self, prompt: &str) -> Result<String, DelegateError> {
        let backend = map_backend(&self.config.provider)?;
        let needs_key = !matches!(backend, LLMBackend::Ollama);
        if needs_key && self.config.api_key.is_empty() {
            return Err(DelegateError::Fatal(format!(
                "no API key configured for provider {}",
                self.config.provider
            )));
        }

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&self.config.model)
            .system(SYSTEM_PROMPT)
            .temperature(0.0)
            .max_tokens(self.config.max_tokens);
        if !self.config.api_key.is_empty() {
            builder = builder.api_key(&self.config.api_key);
        }
        let llm = builder
            .build()
            .map_err(|e| DelegateError::Fatal(format!("build LLM: {e}")))?;

        debug!(provider = %self.config.provider, model = %self.config.model, "Sending classification prompt");
        let messages = vec![ChatMessage::user().content(prompt).build()];
        let response = llm.chat(&messages).await.map_err(map_error)?;

        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            Some(_) => Err(DelegateError::Transient("LLM returned empty text".to_string())),
            None => Err(DelegateError::Transient("LLM returned no text".to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
