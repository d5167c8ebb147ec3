//! Tracing setup.
//!
//! stdout carries the MCP stream, so every layer writes to stderr.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracingFormat {
    /// Human-readable console output (for development).
    #[default]
    Console,
    /// JSON structured logging (for production).
    Json,
}

impl TracingFormat {
    /// Parse a `logging.format` value; anything but `json` is console.
    pub fn from_name(name: &str) -> Self {
        match name {
            "json" => TracingFormat::Json,
            _ => TracingFormat::Console,
        }
    }
}

/// Tracing configuration.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Filter directive used when nothing stronger is given.
    pub log_level: String,
    /// Output format (console or JSON).
    pub format: TracingFormat,
    /// Verbosity from the command line; wins over `RUST_LOG` when non-zero.
    pub verbosity: u8,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: TracingFormat::Console,
            verbosity: 0,
        }
    }
}

impl TracingConfig {
    /// Create a new tracing config with custom settings.
    pub fn new(log_level: String, format: TracingFormat, verbosity: u8) -> Self {
        Self {
            log_level,
            format,
            verbosity,
        }
    }

    /// The filter directive: `-v` count, then `RUST_LOG`, then the config.
    pub fn directive(&self, rust_log: Option<&str>) -> String {
        match (self.verbosity, rust_log) {
            (1, _) => "debug".to_string(),
            (v, _) if v >= 2 => "trace".to_string(),
            (_, Some(env)) if !env.trim().is_empty() => env.to_string(),
            _ => self.log_level.clone(),
        }
    }
}

/// Initialize tracing with the given configuration.
pub fn init_tracing(config: TracingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let env_filter = EnvFilter::try_new(config.directive(rust_log.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = match config.format {
        TracingFormat::Console => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .boxed(),
        TracingFormat::Json => fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!(format = ?config.format, "tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TracingConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, TracingFormat::Console);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(TracingFormat::from_name("json"), TracingFormat::Json);
        assert_eq!(TracingFormat::from_name("console"), TracingFormat::Console);
        assert_eq!(TracingFormat::from_name("pretty"), TracingFormat::Console);
    }

    #[test]
    fn test_directive_precedence() {
        let config = TracingConfig::new("warn".into(), TracingFormat::Console, 0);
        assert_eq!(config.directive(None), "warn");
        assert_eq!(config.directive(Some("qmcp_server=debug")), "qmcp_server=debug");
        assert_eq!(config.directive(Some("  ")), "warn");

        let verbose = TracingConfig::new("warn".into(), TracingFormat::Console, 1);
        assert_eq!(verbose.directive(Some("error")), "debug");
        let very = TracingConfig::new("warn".into(), TracingFormat::Console, 3);
        assert_eq!(very.directive(None), "trace");
    }
}
