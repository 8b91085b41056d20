//! Pipeline orchestrator coordinating every stage of a request
//!
//! The pipeline runs strictly in order:
//! Classifier → Extractor → Builder → Compiler → (optional) Renderer
//!
//! It holds only immutable configuration and shared delegates, so one
//! pipeline can serve concurrent requests.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, warn, Instrument, Level};

use crate::builder::{BuildOutput, JsonBuilder};
use crate::classify::{
    Classification, ClassificationDelegate, DiagramClassifier, KeywordDelegate, LlmDelegate,
};
use crate::compile::PumlCompiler;
use crate::core::{
    BuildWarning, DiagramType, EntityModel, ErrorCategory, HistoryEntry, Metadata, PipelineConfig,
    PipelineError, RequestContext,
};
use crate::render::{ImageHandle, PlantUmlJar, RenderDelegate};

/// Inbound request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Earlier turns of the same conversation, oldest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryEntry>,
}

impl SubmitRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            user_id: None,
            history: Vec::new(),
        }
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_history(mut self, entry: HistoryEntry) -> Self {
        self.history.push(entry);
        self
    }

    pub fn context(&self) -> RequestContext {
        RequestContext {
            user_id: self.user_id.clone(),
            history: self.history.clone(),
        }
    }
}

/// Everything a successful run produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutput {
    pub classification: Classification,
    pub model: EntityModel,
    pub warnings: Vec<BuildWarning>,
    pub puml: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageHandle>,
}

/// Outbound response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitResponse {
    Ok {
        puml: String,
        intent: DiagramType,
        confidence: f64,
        warnings: Vec<BuildWarning>,
        model: EntityModel,
        #[serde(skip_serializing_if = "Option::is_none")]
        image: Option<ImageHandle>,
    },
    Error {
        category: ErrorCategory,
        code: u16,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        clarification: Option<String>,
    },
}

impl SubmitResponse {
    pub fn is_ok(&self) -> bool {
        matches!(self, SubmitResponse::Ok { .. })
    }
}

impl From<PipelineOutput> for SubmitResponse {
    fn from(output: PipelineOutput) -> Self {
        SubmitResponse::Ok {
            puml: output.puml,
            intent: output.classification.intent,
            confidence: output.classification.confidence,
            warnings: output.warnings,
            model: output.model,
            image: output.image,
        }
    }
}

impl From<&PipelineError> for SubmitResponse {
    fn from(err: &PipelineError) -> Self {
        let clarification = match err {
            PipelineError::Unclassifiable { clarification, .. } => clarification.clone(),
            _ => None,
        };
        SubmitResponse::Error {
            category: err.category(),
            code: err.code(),
            message: err.to_string(),
            clarification,
        }
    }
}

/// Text-to-PlantUML pipeline
pub struct Pipeline {
    config: PipelineConfig,
    classifier: DiagramClassifier,
    compiler: PumlCompiler,
    renderer: Option<Arc<dyn RenderDelegate>>,
}

impl Pipeline {
    /// Create a pipeline that classifies through `delegate` and never renders
    pub fn new(config: PipelineConfig, delegate: Arc<dyn ClassificationDelegate>) -> Self {
        let classifier = DiagramClassifier::new(config.classifier.clone(), delegate);
        Self {
            config,
            classifier,
            compiler: PumlCompiler::new(),
            renderer: None,
        }
    }

    /// Create a pipeline that asks the configured model
    pub fn with_llm(config: PipelineConfig) -> Self {
        let delegate = Arc::new(LlmDelegate::new(config.llm.clone()));
        Self::new(config, delegate)
    }

    /// Create a pipeline that classifies with keyword rules only
    pub fn offline(config: PipelineConfig) -> Self {
        Self::new(config, Arc::new(KeywordDelegate::new()))
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn RenderDelegate>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Attach the PlantUML jar renderer described by the configuration
    pub fn with_plantuml(self) -> Self {
        let renderer = Arc::new(PlantUmlJar::new(self.config.renderer.clone()));
        self.with_renderer(renderer)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    pub async fn classify(
        &self,
        text: &str,
        context: &RequestContext,
    ) -> Result<Classification, PipelineError> {
        self.classifier.classify(text, context).await
    }

    /// Classify, build and compile one request
    pub async fn process(&self, request: &SubmitRequest) -> Result<PipelineOutput, PipelineError> {
        let process_span = span!(
            Level::INFO,
            "process_request",
            input_len = request.text.len(),
            user_id = request.user_id.as_deref().unwrap_or("")
        );
        self.run(request).instrument(process_span).await
    }

    async fn run(&self, request: &SubmitRequest) -> Result<PipelineOutput, PipelineError> {
        info!("Starting text to PlantUML pipeline");
        let context = request.context();

        // Step 1: classify
        let classification = self.classifier.classify(&request.text, &context).await?;
        debug!(intent = %classification.intent, confidence = classification.confidence, "Intent decided");

        // Step 2: build
        let BuildOutput { model, warnings } =
            self.builder_for(request, classification.intent)
                .build(&request.text, classification.intent, &context)?;

        // Step 3: compile
        let puml = self.compiler.compile(&model)?;

        info!(
            intent = %classification.intent,
            elements = model.elements().len(),
            warnings = warnings.len(),
            "Pipeline completed successfully"
        );
        Ok(PipelineOutput {
            classification,
            model,
            warnings,
            puml,
            image: None,
        })
    }

    /// [`process`](Self::process), then render next to `output_path`
    pub async fn process_with_render(
        &self,
        request: &SubmitRequest,
        output_path: &Path,
    ) -> Result<PipelineOutput, PipelineError> {
        let mut output = self.process(request).await?;
        output.image = Some(self.render(&output.puml, output_path).await?);
        Ok(output)
    }

    /// Compile a caller supplied JSON model
    pub fn compile_json(&self, json: &str) -> Result<(EntityModel, String), PipelineError> {
        let model = EntityModel::from_json(json)?;
        let puml = self.compiler.compile(&model)?;
        Ok((model, puml))
    }

    pub async fn render(&self, source: &str, output_path: &Path) -> Result<ImageHandle, PipelineError> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| PipelineError::render("no renderer configured"))?;
        renderer.render(source, output_path).await.inspect_err(|err| {
            warn!(renderer = renderer.name(), error = %err, "Rendering failed");
        })
    }

    /// Run a request and fold the result into a response
    pub async fn respond(&self, request: &SubmitRequest, render_to: Option<&Path>) -> SubmitResponse {
        let result = match render_to {
            Some(path) => self.process_with_render(request, path).await,
            None => self.process(request).await,
        };
        match result {
            Ok(output) => output.into(),
            Err(err) => {
                warn!(category = %err.category(), error = %err, "Request failed");
                SubmitResponse::from(&err)
            }
        }
    }

    fn builder_for(&self, request: &SubmitRequest, intent: DiagramType) -> JsonBuilder {
        JsonBuilder::with_metadata(Metadata {
            user_id: request.user_id.clone().unwrap_or_default(),
            created_at: Some(Utc::now()),
            diagram_name: format!("{}_diagram", intent.label()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::DelegateError;
    use async_trait::async_trait;

    struct FixedDelegate(&'static str);

    #[async_trait]
    impl ClassificationDelegate for FixedDelegate {
        async fn call(&self, _prompt: &str) -> Result<String, DelegateError> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    fn pipeline(answer: &'static str) -> Pipeline {
        Pipeline::new(PipelineConfig::default(), Arc::new(FixedDelegate(answer)))
    }

    #[tokio::test]
    async fn test_process_class_text() {
        let request = SubmitRequest::new("Usuario: atributos: id, nombre; métodos: crear()")
            .for_user("u-7");
        let output = pipeline(r#"{"diagram_type": "class"}"#)
            .process(&request)
            .await
            .unwrap();
        assert_eq!(output.classification.intent, DiagramType::Class);
        assert_eq!(output.model.metadata().user_id, "u-7");
        assert_eq!(output.model.metadata().diagram_name, "class_diagram");
        assert!(output.puml.contains("class Usuario {\n"));
        assert!(output.puml.contains("  +crear() : void\n"));
        assert!(output.image.is_none());
    }

    #[tokio::test]
    async fn test_offline_pipeline() {
        let output = Pipeline::offline(PipelineConfig::default())
            .process(&SubmitRequest::new(
                "clases Persona y Alumno. Alumno hereda de Persona",
            ))
            .await
            .unwrap();
        assert_eq!(output.classification.intent, DiagramType::Class);
        assert!(output.puml.contains("Alumno --|> Persona"));
    }

    #[tokio::test]
    async fn test_nothing_to_draw() {
        let err = pipeline(r#"{"diagram_type": "component"}"#)
            .process(&SubmitRequest::new("hola, esto no describe nada"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Build { .. }));
    }

    #[tokio::test]
    async fn test_respond_error_carries_clarification() {
        let response = pipeline(r#"{"resolved": false, "question": "¿Clases?"}"#)
            .respond(&SubmitRequest::new("algo ambiguo aquí"), None)
            .await;
        match response {
            SubmitResponse::Error {
                category,
                code,
                clarification,
                ..
            } => {
                assert_eq!(category, ErrorCategory::Unclassifiable);
                assert_eq!(code, 422);
                assert_eq!(clarification.as_deref(), Some("¿Clases?"));
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_respond_ok_json_shape() {
        let response = pipeline(r#"{"diagram_type": "use_case", "confidence": 0.9}"#)
            .respond(
                &SubmitRequest::new("actor Cliente. Cliente puede comprar producto"),
                None,
            )
            .await;
        assert!(response.is_ok());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["intent"], "use_case");
        assert!(value["puml"].as_str().unwrap().starts_with("@startuml"));
        assert!(value.get("image").is_none());
    }

    #[tokio::test]
    async fn test_render_without_renderer() {
        let p = pipeline(r#"{"diagram_type": "class"}"#);
        assert!(!p.has_renderer());
        let err = p
            .render("@startuml\n@enduml\n", Path::new("out.puml"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 502);
    }

    #[test]
    fn test_compile_json() {
        let p = pipeline(r#"{"diagram_type": "class"}"#);
        let json = r#"{"diagram_type": "sequence",
            "elements": [
                {"id": "a", "kind": "participant", "name": "A"},
                {"id": "b", "kind": "participant", "name": "B"}
            ],
            "relations": [{"from_id": "a", "to_id": "b", "kind": "association", "label": "ping"}]}"#;
        let (model, puml) = p.compile_json(json).unwrap();
        assert_eq!(model.diagram_type(), DiagramType::Sequence);
        assert!(puml.contains("a -> b : ping\n"));
    }

    #[test]
    fn test_compile_json_rejects_unknown_visibility() {
        let p = pipeline(r#"{"diagram_type": "class"}"#);
        let json = r#"{"diagram_type": "class", "elements": [{"id": "A", "kind": "class", "name": "A",
            "attributes": [{"name": "x", "type": "int", "visibility": "secret"}]}]}"#;
        let err = p.compile_json(json).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaViolation { .. }));
    }
}
