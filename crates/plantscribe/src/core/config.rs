//! Pipeline configuration
//!
//! An explicit value handed to `Pipeline::new`. It is loaded from TOML;
//! the library itself never reads the environment for it.
//!
//! ```toml
//! [classifier]
//! strategy = "keywords_first"
//! timeout_ms = 15000
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//!
//! [renderer]
//! jar_dir = "plant_uml_exc"
//! format = "png"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;

/// How the classifier decides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Always ask the classification delegate
    #[default]
    Delegate,
    /// Score keywords locally; ask the delegate only when unsure
    KeywordsFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub strategy: Strategy,
    /// Bound on each delegate call
    pub timeout_ms: u64,
    /// Local confidence under which `keywords_first` asks the delegate
    pub fallback_confidence: f64,
    /// History entries included in the prompt
    pub history_limit: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Delegate,
            timeout_ms: 15_000,
            fallback_confidence: 0.65,
            history_limit: 5,
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            max_tokens: 300,
        }
    }
}

/// Output image format of the external renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Svg,
    Png,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
        }
    }

    /// PlantUML command line flag selecting this format
    pub fn flag(self) -> &'static str {
        match self {
            ImageFormat::Svg => "-tsvg",
            ImageFormat::Png => "-tpng",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(format!("Unknown image format: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Java executable, resolved on PATH
    pub java: String,
    pub jar_dir: PathBuf,
    pub jar_name: String,
    pub format: ImageFormat,
    pub timeout_ms: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jar_dir: PathBuf::from("plant_uml_exc"),
            jar_name: "plantuml-1.2025.2.jar".to_string(),
            format: ImageFormat::Svg,
            timeout_ms: 60_000,
        }
    }
}

impl RendererConfig {
    pub fn jar_path(&self) -> PathBuf {
        self.jar_dir.join(&self.jar_name)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub classifier: ClassifierConfig,
    pub llm: LlmConfig,
    pub renderer: RendererConfig,
}

impl PipelineConfig {
    /// Read and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate TOML; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, PipelineError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| PipelineError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::config(e.to_string()))
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.llm.api_key = api_key.into();
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.classifier.timeout_ms == 0 {
            return Err(PipelineError::config("classifier.timeout_ms must be positive"));
        }
        if !(0.0..=1.0).contains(&self.classifier.fallback_confidence) {
            return Err(PipelineError::config(
                "classifier.fallback_confidence must be between 0 and 1",
            ));
        }
        if self.renderer.timeout_ms == 0 {
            return Err(PipelineError::config("renderer.timeout_ms must be positive"));
        }
        if self.llm.max_tokens == 0 {
            return Err(PipelineError::config("llm.max_tokens must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.classifier.strategy, Strategy::Delegate);
        assert_eq!(config.classifier.timeout(), Duration::from_secs(15));
        assert_eq!(config.classifier.fallback_confidence, 0.65);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 300);
        assert_eq!(
            config.renderer.jar_path(),
            PathBuf::from("plant_uml_exc/plantuml-1.2025.2.jar")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [classifier]
            strategy = "keywords_first"

            [renderer]
            format = "png"
            "#,
        )
        .unwrap();
        assert_eq!(config.classifier.strategy, Strategy::KeywordsFirst);
        assert_eq!(config.classifier.timeout_ms, 15_000);
        assert_eq!(config.renderer.format, ImageFormat::Png);
        assert_eq!(config.renderer.java, "java");
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = PipelineConfig::from_toml_str("[classifier]\ntimeout_ms = 0\n").unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
        assert_eq!(err.code(), 500);

        let err = PipelineConfig::from_toml_str("[classifier]\nstrategy = \"dice\"\n").unwrap_err();
        assert!(matches!(err, PipelineError::Config { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plantscribe.toml");
        std::fs::write(&path, "[llm]\nmodel = \"gpt-4o\"\n").unwrap();
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");

        let missing = PipelineConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(PipelineError::Config { .. })));
    }

    #[test]
    fn test_image_format() {
        assert_eq!(ImageFormat::from_str("PNG").unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::Svg.flag(), "-tsvg");
        assert!(ImageFormat::from_str("gif").is_err());
    }
}
