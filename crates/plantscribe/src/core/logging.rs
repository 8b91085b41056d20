//! Logging infrastructure for the diagram pipeline
//!
//! Structured logging with the `tracing` crate. Every pipeline stage opens
//! its own span, so a single request can be followed from classification
//! to compilation.
//!
//! # Usage
//!
//! ```rust,no_run
//! use plantscribe::core::logging::init_logging;
//!
//! // Initialize with default settings
//! init_logging(None, None).unwrap();
//! ```
//!
//! # Log Formats
//!
//! - `compact`: Single-line format, good for production
//! - `pretty`: Multi-line format with colors, good for development
//! - `json`: JSON format, good for log aggregation systems
//!
//! # Environment Variables
//!
//! - `PLANTSCRIBE_LOG_LEVEL`: Set log level (trace|debug|info|warn|error|off)
//! - `PLANTSCRIBE_LOG_FORMAT`: Set log format (compact|pretty|json)
//! - `RUST_LOG`: Alternative way to set log level (tracing-subscriber standard)
//!
//! # Filtering Logs
//!
//! ```bash
//! # Only the classifier at debug level
//! RUST_LOG="plantscribe::classify=debug" plantscribe generate "..."
//!
//! # Everything at info, the compiler at trace
//! RUST_LOG="info,plantscribe::compile=trace" plantscribe compile model.json
//! ```

use std::str::FromStr;

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact single-line format
    Compact,
    /// Pretty multi-line format with colors
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl LogFormat {
    /// Get all valid format names
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }
}

/// Resolve the level: explicit argument, then `PLANTSCRIBE_LOG_LEVEL`,
/// then `RUST_LOG`, then `info`
fn resolve_level(level: Option<&str>) -> String {
    level
        .map(|s| s.to_string())
        .or_else(|| std::env::var("PLANTSCRIBE_LOG_LEVEL").ok())
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string())
}

fn resolve_format(format: Option<&str>) -> String {
    format
        .map(|s| s.to_string())
        .or_else(|| std::env::var("PLANTSCRIBE_LOG_FORMAT").ok())
        .unwrap_or_else(|| "compact".to_string())
}

/// Build the level filter; an unparsable level falls back to `RUST_LOG`,
/// then to `info`
fn level_filter(level: &str) -> EnvFilter {
    if level == "off" {
        return EnvFilter::new("off");
    }
    EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber
///
/// Logs go to stderr so that generated PlantUML on stdout stays clean.
/// `compact` hides targets, `pretty` adds source locations and span
/// activity, `json` reports spans when they close.
///
/// # Returns
///
/// Returns an error if the format is unknown or a global subscriber is
/// already installed.
pub fn init_logging(
    level: Option<&str>,
    format: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = LogFormat::from_str(&resolve_format(format))
        .map_err(|e| format!("Invalid log format: {}", e))?;
    let registry = Registry::default().with(level_filter(&resolve_level(level)));
    let stderr = fmt::layer().with_writer(std::io::stderr);

    match format {
        LogFormat::Compact => registry
            .with(stderr.compact().with_target(false))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                stderr
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::ACTIVE),
            )
            .try_init()?,
        LogFormat::Json => registry
            .with(
                stderr
                    .json()
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?,
    }

    Ok(())
}

/// [`init_logging`] with no overrides: environment, else `info` and `compact`
pub fn init_default_logging() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(None, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("compact").unwrap(), LogFormat::Compact);
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("COMPACT").unwrap(), LogFormat::Compact);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_format_variants() {
        let variants = LogFormat::variants();
        assert!(variants.contains(&"compact"));
        assert!(variants.contains(&"pretty"));
        assert!(variants.contains(&"json"));
    }

    #[test]
    fn test_explicit_arguments_win() {
        assert_eq!(resolve_level(Some("debug")), "debug");
        assert_eq!(resolve_format(Some("json")), "json");
    }

    #[test]
    fn test_off_level() {
        assert_eq!(level_filter("off").to_string(), "off");
    }

    #[test]
    fn test_invalid_format_is_rejected() {
        assert!(init_logging(Some("info"), Some("yaml")).is_err());
    }
}
