//! Command-line interface for the plantscribe utility
//!
//! Turns free-text design descriptions into PlantUML source, compiles
//! JSON entity models and optionally renders images with a local PlantUML
//! jar.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::colorizer::colorize_puml;
use crate::edit::{self, EditAction};
use plantscribe::core::logging::init_logging;
use plantscribe::prelude::*;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "plantscribe.toml";

/// Environment variables consulted, in order, when no API key is configured
pub const API_KEY_VARS: &[&str] = &["PLANTSCRIBE_API_KEY", "OPENAI_API_KEY"];

/// Plantscribe - Turn free-text design descriptions into PlantUML
#[derive(Parser)]
#[command(name = "plantscribe")]
#[command(about = "Turn free-text software design descriptions into PlantUML diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Configuration file (defaults to ./plantscribe.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate PlantUML from a free-text description
    Generate {
        /// Description text (reads --input or stdin when omitted)
        text: Option<String>,

        /// Input file containing the description (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for PlantUML source (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Classify with local keyword rules instead of the language model
        #[arg(long)]
        offline: bool,

        /// Print the full JSON response instead of PlantUML
        #[arg(long)]
        json: bool,

        /// Also render an image; the PlantUML source is written to this path
        #[arg(long, value_name = "PUML_PATH")]
        render: Option<PathBuf>,

        /// User the request is made for
        #[arg(long)]
        user_id: Option<String>,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Decide which diagram type a description asks for
    Classify {
        /// Description text (reads --input or stdin when omitted)
        text: Option<String>,

        /// Input file containing the description (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Classify with local keyword rules instead of the language model
        #[arg(long)]
        offline: bool,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Compile a JSON entity model into PlantUML
    Compile {
        /// Input file containing the JSON model (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for PlantUML source (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also render an image; the PlantUML source is written to this path
        #[arg(long, value_name = "PUML_PATH")]
        render: Option<PathBuf>,

        /// When to use colors in output
        #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
        color: ColorChoice,
    },

    /// Check a JSON entity model against the diagram rules
    Validate {
        /// Input file to validate (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Edit a JSON entity model file in place
    Edit {
        /// Model file to edit
        model: PathBuf,

        /// Write the edited model here instead (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(subcommand)]
        action: EditAction,
    },

    /// Show supported diagram types
    Types {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Main CLI application
pub struct PlantscribeApp {
    config: PipelineConfig,
}

impl PlantscribeApp {
    /// Create a new application instance with default settings
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a new application instance with a pipeline config
    pub fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the application with the given CLI arguments
    pub fn run(mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over CLI flags
        let log_level_str = std::env::var("PLANTSCRIBE_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| Some(cli.log_level.as_str().to_string()));

        let log_format_str = std::env::var("PLANTSCRIBE_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Plantscribe v{}", env!("CARGO_PKG_VERSION"));
        }

        self.config = load_config(cli.config.as_deref())?;
        self.config = overlay_api_key(self.config.clone(), |name| std::env::var(name).ok());

        match cli.command {
            Commands::Generate {
                text,
                input,
                output,
                offline,
                json,
                render,
                user_id,
                color,
            } => {
                let text = self.read_text(text, input)?;
                self.generate_command(
                    &text,
                    GenerateOptions {
                        output,
                        offline,
                        json,
                        render,
                        user_id,
                        color,
                    },
                    cli.verbose,
                )
            }
            Commands::Classify {
                text,
                input,
                offline,
                json,
            } => {
                let text = self.read_text(text, input)?;
                self.classify_command(&text, offline, json, cli.verbose)
            }
            Commands::Compile {
                input,
                output,
                render,
                color,
            } => self.compile_command(input, output, render, color, cli.verbose),
            Commands::Validate { input } => self.validate_command(input, cli.verbose),
            Commands::Edit {
                model,
                output,
                action,
            } => self.edit_command(&model, output, action, cli.verbose),
            Commands::Types { json } => self.types_command(json, cli.verbose),
        }
    }

    /// Build the pipeline for one command
    fn pipeline(&self, offline: bool, render: bool) -> Pipeline {
        let pipeline = if offline {
            Pipeline::offline(self.config.clone())
        } else {
            Pipeline::with_llm(self.config.clone())
        };
        if render {
            pipeline.with_plantuml()
        } else {
            pipeline
        }
    }

    /// Handle the generate command
    fn generate_command(&self, text: &str, options: GenerateOptions, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Read {} bytes of input", text.len());
        }

        let pipeline = self.pipeline(options.offline, options.render.is_some());
        let mut request = SubmitRequest::new(text);
        if let Some(user_id) = options.user_id {
            request = request.for_user(user_id);
        }
        let runtime = runtime()?;

        if options.json {
            let response =
                runtime.block_on(pipeline.respond(&request, options.render.as_deref()));
            let body = serde_json::to_string_pretty(&response)?;
            self.write_output(options.output, &body)?;
            return match response {
                SubmitResponse::Ok { .. } => Ok(()),
                SubmitResponse::Error { message, .. } => Err(anyhow!(message)),
            };
        }

        let output = match runtime.block_on(pipeline.process(&request)) {
            Ok(output) => output,
            Err(err) => {
                if let PipelineError::Unclassifiable {
                    clarification: Some(question),
                    ..
                } = &err
                {
                    eprintln!("{}", question);
                }
                return Err(err.into());
            }
        };

        if verbose {
            eprintln!(
                "Classified as {} ({:.2})",
                output.classification.intent, output.classification.confidence
            );
        }
        for warning in &output.warnings {
            eprintln!("warning: {}", warning);
        }

        self.emit_puml(&output.puml, options.output, options.color)?;

        if let Some(path) = options.render {
            let image = runtime.block_on(pipeline.render(&output.puml, &path))?;
            eprintln!("Rendered {}", image.path.display());
        }
        Ok(())
    }

    /// Handle the classify command
    fn classify_command(&self, text: &str, offline: bool, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Read {} bytes of input", text.len());
        }

        let pipeline = self.pipeline(offline, false);
        let runtime = runtime()?;
        let classification =
            match runtime.block_on(pipeline.classify(text, &RequestContext::new())) {
                Ok(classification) => classification,
                Err(err) => {
                    if json {
                        let body = serde_json::to_string_pretty(&SubmitResponse::from(&err))?;
                        println!("{}", body);
                    } else if let PipelineError::Unclassifiable {
                        clarification: Some(question),
                        ..
                    } = &err
                    {
                        eprintln!("{}", question);
                    }
                    return Err(err.into());
                }
            };

        if json {
            println!("{}", serde_json::to_string_pretty(&classification)?);
        } else {
            println!(
                "{} ({:.2})",
                classification.intent, classification.confidence
            );
            if verbose {
                if let Some(rationale) = &classification.rationale {
                    eprintln!("{}", rationale);
                }
            }
        }
        Ok(())
    }

    /// Handle the compile command
    fn compile_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        render: Option<PathBuf>,
        color: ColorChoice,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let pipeline = self.pipeline(true, render.is_some());
        let (model, puml) = pipeline.compile_json(&content)?;

        if verbose {
            eprintln!(
                "Compiled {} diagram with {} elements",
                model.diagram_type(),
                model.elements().len()
            );
        }

        self.emit_puml(&puml, output, color)?;

        if let Some(path) = render {
            let image = runtime()?.block_on(pipeline.render(&puml, &path))?;
            eprintln!("Rendered {}", image.path.display());
        }
        Ok(())
    }

    /// Handle the validate command
    fn validate_command(&self, input: Option<PathBuf>, verbose: bool) -> Result<()> {
        let content = self.read_input(input)?;

        if verbose {
            eprintln!("Read {} bytes of input", content.len());
        }

        let result = EntityModel::from_json(&content).and_then(|model| {
            model.validate()?;
            Ok(model)
        });

        match result {
            Ok(model) => {
                println!(
                    "✓ Valid {} model ({} elements, {} relations)",
                    model.diagram_type(),
                    model.elements().len(),
                    model.relations().len()
                );
                Ok(())
            }
            Err(e) => {
                println!("✗ Invalid model: {}", e);
                Err(e.into())
            }
        }
    }

    /// Handle the edit command: load, apply, validate, save
    fn edit_command(
        &self,
        path: &Path,
        output: Option<PathBuf>,
        action: EditAction,
        verbose: bool,
    ) -> Result<()> {
        let mut model = match &action {
            EditAction::Init { diagram_type } => {
                if path.exists() {
                    return Err(anyhow!("Model file '{}' already exists", path.display()));
                }
                EntityModel::new(*diagram_type)
            }
            _ => {
                let content = fs::read_to_string(path).map_err(|e| {
                    anyhow!("Failed to read model file '{}': {}", path.display(), e)
                })?;
                EntityModel::from_json(&content)?
            }
        };

        if verbose {
            eprintln!(
                "Loaded {} model with {} elements",
                model.diagram_type(),
                model.elements().len()
            );
        }

        let outcome = edit::apply(&mut model, action)?;
        if !outcome.changed {
            println!("{}", outcome.message);
            return Ok(());
        }

        model.validate()?;
        let target = output.unwrap_or_else(|| path.to_path_buf());
        self.write_output(Some(target), &format!("{}\n", model.to_json_pretty()?))?;
        eprintln!("{}", outcome.message);
        Ok(())
    }

    /// Handle the types command
    fn types_command(&self, json: bool, verbose: bool) -> Result<()> {
        if verbose {
            eprintln!("Listing supported diagram types");
        }

        let types = DiagramType::all();
        if json {
            let supported: Vec<_> = types
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.label(),
                        "description": t.description(),
                    })
                })
                .collect();
            let body = serde_json::json!({
                "supported_types": supported,
                "total": types.len(),
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            println!("Supported diagram types:");
            for t in types {
                println!("  {:<10} - {}", t.label(), t.description());
            }
            println!();
            println!("Total: {} diagram types supported", types.len());
        }

        Ok(())
    }

    fn emit_puml(&self, puml: &str, output: Option<PathBuf>, color: ColorChoice) -> Result<()> {
        if should_colorize(&output, color) {
            self.write_output(output, &colorize_puml(puml))
        } else {
            self.write_output(output, puml)
        }
    }

    /// Positional text wins over --input
    fn read_text(&self, text: Option<String>, input: Option<PathBuf>) -> Result<String> {
        match text {
            Some(text) => Ok(text),
            None => self.read_input(input),
        }
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for PlantscribeApp {
    fn default() -> Self {
        Self::new()
    }
}

struct GenerateOptions {
    output: Option<PathBuf>,
    offline: bool,
    json: bool,
    render: Option<PathBuf>,
    user_id: Option<String>,
    color: ColorChoice,
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Load `path`, else `./plantscribe.toml` when present, else defaults
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
        None => {
            debug!("No configuration file, using defaults");
            return Ok(PipelineConfig::default());
        }
    };
    debug!(path = %path.display(), "Loading configuration");
    Ok(PipelineConfig::load(path)?)
}

/// Fill an empty API key from the first non-empty variable in [`API_KEY_VARS`]
pub fn overlay_api_key(
    config: PipelineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> PipelineConfig {
    if !config.llm.api_key.is_empty() {
        return config;
    }
    match API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|key| !key.is_empty())
    {
        Some(key) => config.with_api_key(key),
        None => config,
    }
}

/// Determine if we should colorize the output based on color choice and output destination
fn should_colorize(output: &Option<PathBuf>, color: ColorChoice) -> bool {
    match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            if std::env::var("NO_COLOR").is_ok() {
                return false;
            }
            match output {
                None => crossterm::tty::IsTty::is_tty(&std::io::stdout()),
                Some(p) if p.to_str() == Some("-") => {
                    crossterm::tty::IsTty::is_tty(&std::io::stdout())
                }
                Some(_) => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing_generate_command() {
        let args = vec![
            "plantscribe",
            "generate",
            "clase User con atributos id",
            "--output",
            "out.puml",
            "--offline",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Generate {
                text,
                input,
                output,
                offline,
                json,
                render,
                user_id,
                color,
            } => {
                assert_eq!(text.as_deref(), Some("clase User con atributos id"));
                assert!(input.is_none());
                assert_eq!(output.unwrap().to_string_lossy(), "out.puml");
                assert!(offline);
                assert!(!json);
                assert!(render.is_none());
                assert!(user_id.is_none());
                assert_eq!(color, ColorChoice::Auto); // default
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parsing_render_option() {
        let args = vec!["plantscribe", "generate", "--render", "out/diagram.puml"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Generate { render, text, .. } => {
                assert_eq!(render.unwrap(), PathBuf::from("out/diagram.puml"));
                assert!(text.is_none());
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_flags_after_subcommand() {
        let args = vec![
            "plantscribe",
            "classify",
            "--offline",
            "--log-level",
            "debug",
            "--config",
            "custom.toml",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(cli.config.unwrap(), PathBuf::from("custom.toml"));
        assert!(matches!(cli.command, Commands::Classify { offline: true, .. }));
    }

    #[test]
    fn test_cli_parsing_edit_command() {
        let args = vec![
            "plantscribe",
            "edit",
            "model.json",
            "add-attribute",
            "User",
            "id:int",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Edit {
                model,
                output,
                action,
            } => {
                assert_eq!(model, PathBuf::from("model.json"));
                assert!(output.is_none());
                assert_eq!(
                    action,
                    EditAction::AddAttribute {
                        id: "User".to_string(),
                        member: "id:int".to_string(),
                    }
                );
            }
            _ => panic!("Expected Edit command"),
        }
    }

    #[test]
    fn test_cli_parsing_edit_kinds() {
        let args = vec![
            "plantscribe",
            "edit",
            "model.json",
            "relate",
            "Car",
            "Wheel",
            "--kind",
            "composition",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Edit {
                action: EditAction::Relate {
                    kind: RelationKind::Composition,
                    ..
                },
                ..
            }
        ));

        let args = vec!["plantscribe", "edit", "m.json", "add", "X", "--kind", "spaceship"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_cli_parsing_types_command() {
        let args = vec!["plantscribe", "types", "--json"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Types { json } => {
                assert!(json);
            }
            _ => panic!("Expected Types command"),
        }
    }

    #[test]
    fn test_cli_parsing_validate_command() {
        let args = vec!["plantscribe", "validate"];
        let cli = Cli::try_parse_from(args).unwrap();

        match cli.command {
            Commands::Validate { input } => {
                assert!(input.is_none());
            }
            _ => panic!("Expected Validate command"),
        }
    }

    #[test]
    fn test_verbose_flag() {
        let args = vec!["plantscribe", "--verbose", "types"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_read_input_from_file() {
        let app = PlantscribeApp::new();
        let input = "clases Persona y Alumno";

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("request.txt");
        fs::write(&file_path, input).unwrap();

        let content = app.read_input(Some(file_path)).unwrap();
        assert_eq!(content, input);
    }

    #[test]
    fn test_read_input_missing_file() {
        let app = PlantscribeApp::new();
        let err = app
            .read_input(Some(PathBuf::from("/nonexistent/request.txt")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_positional_text_wins() {
        let app = PlantscribeApp::new();
        let text = app
            .read_text(Some("inline".to_string()), Some(PathBuf::from("ignored")))
            .unwrap();
        assert_eq!(text, "inline");
    }

    #[test]
    fn test_write_output_to_file() {
        let app = PlantscribeApp::new();
        let output = "@startuml\n@enduml\n";

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("diagram.puml");

        app.write_output(Some(file_path.clone()), output).unwrap();

        let read_content = fs::read_to_string(&file_path).unwrap();
        assert_eq!(read_content, output);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plantscribe.toml");
        fs::write(&path, "[classifier]\nstrategy = \"keywords_first\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(
            config.classifier.strategy,
            plantscribe::core::Strategy::KeywordsFirst
        );
    }

    #[test]
    fn test_load_config_rejects_bad_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[classifier]\ntimeout_ms = 0\n").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_overlay_api_key_uses_first_non_empty_var() {
        let config = overlay_api_key(PipelineConfig::default(), |name| match name {
            "PLANTSCRIBE_API_KEY" => Some(String::new()),
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        });
        assert_eq!(config.llm.api_key, "sk-test");
    }

    #[test]
    fn test_overlay_api_key_keeps_configured_key() {
        let config = PipelineConfig::default().with_api_key("from-file");
        let config = overlay_api_key(config, |_| Some("from-env".to_string()));
        assert_eq!(config.llm.api_key, "from-file");
    }

    #[test]
    fn test_should_colorize_choices() {
        assert!(should_colorize(&None, ColorChoice::Always));
        assert!(!should_colorize(&None, ColorChoice::Never));
        assert!(!should_colorize(
            &Some(PathBuf::from("diagram.puml")),
            ColorChoice::Auto
        ));
    }

    #[test]
    fn test_types_command_formats() {
        let app = PlantscribeApp::default();
        assert!(app.types_command(true, false).is_ok());
        assert!(app.types_command(false, false).is_ok());
    }

    #[test]
    fn test_validate_command_rejects_dangling_relation() {
        let app = PlantscribeApp::new();
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(
            &path,
            r#"{"diagram_type": "class",
                "elements": [{"id": "A", "kind": "class", "name": "A"}],
                "relations": [{"from_id": "A", "to_id": "B", "kind": "association"}]}"#,
        )
        .unwrap();

        assert!(app.validate_command(Some(path), false).is_err());
    }
}
