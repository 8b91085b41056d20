//! Integration tests for logging around the pipeline

use plantscribe::core::logging::init_logging;
use plantscribe::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::test]
async fn test_pipeline_runs_under_trace_subscriber() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let output = plantscribe::generate_offline("clases Persona y Alumno. Alumno hereda de Persona")
        .await
        .unwrap();
    assert!(output.puml.contains("class Persona"));
}

#[test]
fn test_compile_with_global_logging() {
    // A second init in the same process only reports an error
    let _ = init_logging(Some("debug"), Some("compact"));

    let puml = plantscribe::compile_json(
        r#"{"diagram_type": "component",
            "elements": [{"id": "Web", "kind": "component", "name": "Web"}]}"#,
    )
    .unwrap();
    assert_eq!(puml, "@startuml\ncomponent Web\n@enduml\n");
}

#[test]
fn test_unknown_format_is_rejected() {
    let err = init_logging(Some("info"), Some("xml")).unwrap_err();
    assert!(err.to_string().contains("Invalid log format"));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plantscribe.toml");

    let mut config = PipelineConfig::default();
    config.classifier.timeout_ms = 2_000;
    config.llm.model = "llama3".to_string();
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    let loaded = PipelineConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}
