//! Core error types for the text-to-PlantUML pipeline
//!
//! Every stage fails fast with a typed [`PipelineError`]. Non-fatal issues
//! never become errors; they travel as [`BuildWarning`]s next to a result.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{DiagramType, ElementKind, RelationKind};

/// Core error types for diagram generation
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Classification unavailable after {attempts} attempt(s): {message}")]
    ClassificationUnavailable { message: String, attempts: u32 },

    #[error("Unclassifiable text: {label}")]
    Unclassifiable {
        label: String,
        clarification: Option<String>,
    },

    #[error("Build error: {message}")]
    Build { message: String },

    #[error("Schema violation: {message}")]
    SchemaViolation { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PipelineError {
    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new classification unavailable error
    pub fn classification_unavailable(message: impl Into<String>, attempts: u32) -> Self {
        Self::ClassificationUnavailable {
            message: message.into(),
            attempts,
        }
    }

    /// Create a new unclassifiable error
    pub fn unclassifiable(label: impl Into<String>, clarification: Option<String>) -> Self {
        Self::Unclassifiable {
            label: label.into(),
            clarification,
        }
    }

    /// Create a new build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a new schema violation error
    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The caller-facing category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } => ErrorCategory::InvalidInput,
            Self::ClassificationUnavailable { .. } => ErrorCategory::RetryLater,
            Self::Unclassifiable { .. } => ErrorCategory::Unclassifiable,
            Self::Build { .. } => ErrorCategory::NothingToDraw,
            Self::SchemaViolation { .. } => ErrorCategory::InvalidModel,
            Self::Render { .. } => ErrorCategory::RenderingUnavailable,
            Self::Config { .. } => ErrorCategory::Internal,
        }
    }

    /// Response code used by the inbound boundary
    pub fn code(&self) -> u16 {
        self.category().code()
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        Self::schema_violation(err.to_string())
    }
}

/// Distinct failure categories so callers can tell "fix your input" from
/// "try again later" from "rendering unavailable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InvalidInput,
    Unclassifiable,
    NothingToDraw,
    InvalidModel,
    RetryLater,
    RenderingUnavailable,
    Internal,
}

impl ErrorCategory {
    pub fn code(self) -> u16 {
        match self {
            ErrorCategory::InvalidInput => 400,
            ErrorCategory::Unclassifiable
            | ErrorCategory::NothingToDraw
            | ErrorCategory::InvalidModel => 422,
            ErrorCategory::Internal => 500,
            ErrorCategory::RenderingUnavailable => 502,
            ErrorCategory::RetryLater => 503,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Unclassifiable => "unclassifiable",
            ErrorCategory::NothingToDraw => "nothing_to_draw",
            ErrorCategory::InvalidModel => "invalid_model",
            ErrorCategory::RetryLater => "retry_later",
            ErrorCategory::RenderingUnavailable => "rendering_unavailable",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-fatal issue found while building a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum BuildWarning {
    /// A relation named an element that was never extracted; it was dropped
    DanglingRelation {
        from_id: String,
        to_id: String,
        missing: String,
    },
    /// A relation kind that the diagram type does not allow; it was dropped
    IllegalRelation {
        from_id: String,
        to_id: String,
        kind: RelationKind,
        diagram_type: DiagramType,
    },
    /// A second element with an id already in use; it was dropped
    DuplicateElement { id: String },
    /// An element kind that the diagram type does not allow; it was dropped
    IllegalElement {
        id: String,
        kind: ElementKind,
        diagram_type: DiagramType,
    },
    /// An element with an empty id or name; it was dropped
    UnnamedElement { id: String },
    /// A member extracted for an element kind that cannot hold members
    DroppedMembers { id: String, count: usize },
    /// An element placed in a package that does not exist; it was kept at
    /// the enclosing level
    UnknownPackage { id: String, package: String },
    /// A relation with a package as endpoint; it was dropped
    PackageRelation {
        from_id: String,
        to_id: String,
        package: String,
    },
    /// A member list that follows no class in the text; it was dropped
    UnreadMembers { section: String },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::DanglingRelation {
                from_id,
                to_id,
                missing,
            } => write!(
                f,
                "dropped relation {} -> {}: element '{}' was not found",
                from_id, to_id, missing
            ),
            BuildWarning::IllegalRelation {
                from_id,
                to_id,
                kind,
                diagram_type,
            } => write!(
                f,
                "dropped {} relation {} -> {}: not allowed in a {} diagram",
                kind, from_id, to_id, diagram_type
            ),
            BuildWarning::DuplicateElement { id } => {
                write!(f, "dropped duplicate element '{}'", id)
            }
            BuildWarning::IllegalElement {
                id,
                kind,
                diagram_type,
            } => write!(
                f,
                "dropped {} '{}': not allowed in a {} diagram",
                kind, id, diagram_type
            ),
            BuildWarning::UnnamedElement { id } => {
                write!(f, "dropped element '{}' with an empty id or name", id)
            }
            BuildWarning::DroppedMembers { id, count } => {
                write!(f, "dropped {} member(s) of '{}'", count, id)
            }
            BuildWarning::UnknownPackage { id, package } => write!(
                f,
                "moved '{}' out of package '{}': no such package",
                id, package
            ),
            BuildWarning::PackageRelation {
                from_id,
                to_id,
                package,
            } => write!(
                f,
                "dropped relation {} -> {}: '{}' is a package",
                from_id, to_id, package
            ),
            BuildWarning::UnreadMembers { section } => write!(
                f,
                "dropped members '{}': no class is named before them",
                section
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_error() {
        let error = PipelineError::invalid_input("text is empty");
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Invalid input"));
        assert!(error_msg.contains("text is empty"));
        assert_eq!(error.code(), 400);
    }

    #[test]
    fn test_classification_unavailable_error() {
        let error = PipelineError::classification_unavailable("timed out", 2);
        let error_msg = format!("{}", error);
        assert!(error_msg.contains("2 attempt(s)"));
        assert_eq!(error.category(), ErrorCategory::RetryLater);
        assert_eq!(error.code(), 503);
    }

    #[test]
    fn test_render_error_is_distinct_from_schema_violation() {
        let render = PipelineError::render("java not found");
        let schema = PipelineError::schema_violation("dangling relation");
        assert_ne!(render.category(), schema.category());
        assert_eq!(render.code(), 502);
        assert_eq!(schema.code(), 422);
    }

    #[test]
    fn test_serde_error_conversion() {
        let err = serde_json::from_str::<u32>("nope").unwrap_err();
        let error: PipelineError = err.into();
        assert!(matches!(error, PipelineError::SchemaViolation { .. }));
    }

    #[test]
    fn test_warning_display() {
        let warning = BuildWarning::DanglingRelation {
            from_id: "Perro".to_string(),
            to_id: "Animal".to_string(),
            missing: "Animal".to_string(),
        };
        assert_eq!(
            warning.to_string(),
            "dropped relation Perro -> Animal: element 'Animal' was not found"
        );
    }
}
