//! External image rendering
//!
//! Rendering is optional and lives outside the compiler: a failure here is
//! a [`PipelineError::Render`], never a compilation error. The shipped
//! delegate runs the PlantUML jar under `java`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, span, warn, Instrument, Level};

use crate::core::{ImageFormat, PipelineError, RendererConfig};

/// A rendered image on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageHandle {
    pub path: PathBuf,
    pub format: ImageFormat,
}

#[async_trait]
pub trait RenderDelegate: Send + Sync {
    /// Write `source` to `output_path` (a `.puml` file) and render it next
    /// to that file
    async fn render(&self, source: &str, output_path: &Path) -> Result<ImageHandle, PipelineError>;

    fn name(&self) -> &'static str;
}

/// `java -jar <jar_dir>/<jar_name> -t<format> -o <dir> <file>.puml`
pub struct PlantUmlJar {
    config: RendererConfig,
}

impl PlantUmlJar {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Arguments passed to `java`
    pub fn args(&self, source_path: &Path, out_dir: &Path) -> Vec<OsString> {
        vec![
            OsString::from("-jar"),
            self.config.jar_path().into_os_string(),
            OsString::from(self.config.format.flag()),
            OsString::from("-o"),
            out_dir.as_os_str().to_os_string(),
            source_path.as_os_str().to_os_string(),
        ]
    }

    /// Where PlantUML writes the image for `source_path`
    ///
    /// PlantUML keeps every dot of the source stem: `v1.2.puml` becomes
    /// `v1.2.svg`.
    pub fn image_path(&self, source_path: &Path, out_dir: &Path) -> PathBuf {
        let mut name = source_path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_else(|| OsString::from("diagram"));
        name.push(".");
        name.push(self.config.format.extension());
        out_dir.join(name)
    }

    /// The `.puml` file written for `output_path`; other extensions are
    /// kept and `.puml` appended
    pub fn source_path(output_path: &Path) -> PathBuf {
        if output_path.extension().is_some_and(|ext| ext == "puml") {
            return output_path.to_path_buf();
        }
        let mut name = output_path.as_os_str().to_os_string();
        name.push(".puml");
        PathBuf::from(name)
    }

    async fn run(&self, source: &str, output_path: &Path) -> Result<ImageHandle, PipelineError> {
        let source_path = Self::source_path(output_path);
        let out_dir = match source_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&out_dir)
            .await
            .map_err(|e| PipelineError::render(format!("create {}: {e}", out_dir.display())))?;
        tokio::fs::write(&source_path, source)
            .await
            .map_err(|e| PipelineError::render(format!("write {}: {e}", source_path.display())))?;
        // PlantUML resolves a relative -o against the source file's directory
        let out_dir = tokio::fs::canonicalize(&out_dir)
            .await
            .map_err(|e| PipelineError::render(format!("resolve {}: {e}", out_dir.display())))?;

        let jar = self.config.jar_path();
        if tokio::fs::metadata(&jar).await.is_err() {
            return Err(PipelineError::render(format!(
                "PlantUML jar not found at {}",
                jar.display()
            )));
        }
        let java = which::which(&self.config.java).map_err(|e| {
            PipelineError::render(format!("java executable '{}' not found: {e}", self.config.java))
        })?;
        debug!(java = %java.display(), jar = %jar.display(), "Running PlantUML");

        let mut command = tokio::process::Command::new(&java);
        command
            .args(self.args(&source_path, &out_dir))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.config.timeout(), command.output()).await {
            Ok(result) => result
                .map_err(|e| PipelineError::render(format!("failed to start java: {e}")))?,
            Err(_) => {
                warn!(timeout_ms = self.config.timeout_ms, "PlantUML timed out");
                return Err(PipelineError::render(format!(
                    "PlantUML timed out after {} ms",
                    self.config.timeout_ms
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::render(format!(
                "PlantUML exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let image = self.image_path(&source_path, &out_dir);
        if tokio::fs::metadata(&image).await.is_err() {
            return Err(PipelineError::render(format!(
                "PlantUML produced no image at {}",
                image.display()
            )));
        }
        info!(image = %image.display(), "Rendered diagram");
        Ok(ImageHandle {
            path: image,
            format: self.config.format,
        })
    }
}

#[async_trait]
impl RenderDelegate for PlantUmlJar {
    async fn render(&self, source: &str, output_path: &Path) -> Result<ImageHandle, PipelineError> {
        let render_span = span!(Level::INFO, "render", output = %output_path.display());
        self.run(source, output_path).instrument(render_span).await
    }

    fn name(&self) -> &'static str {
        "plantuml-jar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "@startuml\nclass A\n@enduml\n";

    #[test]
    fn test_command_line() {
        let jar = PlantUmlJar::new(RendererConfig::default());
        let args = jar.args(Path::new("out/diagram.puml"), Path::new("/tmp/out"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-jar",
                "plant_uml_exc/plantuml-1.2025.2.jar",
                "-tsvg",
                "-o",
                "/tmp/out",
                "out/diagram.puml",
            ]
        );
    }

    #[test]
    fn test_image_path_follows_format() {
        let config = RendererConfig {
            format: ImageFormat::Png,
            ..RendererConfig::default()
        };
        let jar = PlantUmlJar::new(config);
        assert_eq!(
            jar.image_path(Path::new("x/report.puml"), Path::new("/out")),
            PathBuf::from("/out/report.png")
        );
    }

    #[test]
    fn test_dotted_stem_is_kept() {
        let jar = PlantUmlJar::new(RendererConfig::default());
        assert_eq!(
            jar.image_path(Path::new("out/v1.2.puml"), Path::new("out")),
            PathBuf::from("out/v1.2.svg")
        );
        assert_eq!(
            PlantUmlJar::source_path(Path::new("out/v1.2")),
            PathBuf::from("out/v1.2.puml")
        );
        assert_eq!(
            PlantUmlJar::source_path(Path::new("out/v1.2.puml")),
            PathBuf::from("out/v1.2.puml")
        );
    }

    #[tokio::test]
    async fn test_missing_jar_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = RendererConfig {
            jar_dir: dir.path().join("nowhere"),
            ..RendererConfig::default()
        };
        let output = dir.path().join("diagram.puml");
        let err = PlantUmlJar::new(config).render(SOURCE, &output).await.unwrap_err();
        assert!(matches!(err, PipelineError::Render { .. }));
        assert_eq!(err.code(), 502);
        assert!(err.to_string().contains("jar not found"));
        // The source is still written for the caller
        assert_eq!(std::fs::read_to_string(&output).unwrap(), SOURCE);
    }

    #[tokio::test]
    async fn test_missing_java_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plantuml.jar"), b"").unwrap();
        let config = RendererConfig {
            java: "plantscribe-no-such-java".into(),
            jar_dir: dir.path().to_path_buf(),
            jar_name: "plantuml.jar".into(),
            ..RendererConfig::default()
        };
        let err = PlantUmlJar::new(config)
            .render(SOURCE, &dir.path().join("out/diagram.svg"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("plantscribe-no-such-java"));
        assert!(dir.path().join("out/diagram.puml").exists());
    }
}
