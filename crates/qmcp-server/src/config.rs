//! Configuration management for the qmcp server.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with QMCP_ prefix)
//! 3. .env files
//!
//! Configuration precedence (highest to lowest):
//! 1. Environment variables
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest simulator width accepted by validation.
pub const MAX_SIMULATED_QUBITS: usize = 30;

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// MCP server identity
    #[serde(default)]
    pub server: ServerConfig,

    /// Simulator limits and sampling
    #[serde(default)]
    pub simulator: SimulatorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server identity reported on `initialize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server name
    #[serde(default = "default_server_name")]
    pub name: String,
}

/// Simulator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Widest circuit the simulator accepts
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,

    /// Upper bound for `shots` on `run_circuit`
    #[serde(default = "default_max_shots")]
    pub max_shots: u32,

    /// `shots` used when the caller gives none
    #[serde(default = "default_shots")]
    pub default_shots: u32,

    /// Fixed RNG seed for reproducible sampling
    #[serde(default)]
    pub seed: Option<u64>,

    /// Widest ansatz `create_variational_circuit` builds
    #[serde(default = "default_max_ansatz_qubits")]
    pub max_ansatz_qubits: u32,

    /// Most repetitions `create_variational_circuit` builds
    #[serde(default = "default_max_ansatz_layers")]
    pub max_ansatz_layers: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "console" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_server_name() -> String {
    "qmcp".to_string()
}

fn default_max_qubits() -> usize {
    qmcp_sim::DEFAULT_MAX_QUBITS
}

fn default_max_shots() -> u32 {
    1_000_000
}

fn default_shots() -> u32 {
    1000
}

fn default_max_ansatz_qubits() -> u32 {
    256
}

fn default_max_ansatz_layers() -> u32 {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: default_max_qubits(),
            max_shots: default_max_shots(),
            default_shots: default_shots(),
            seed: None,
            max_ansatz_qubits: default_max_ansatz_qubits(),
            max_ansatz_layers: default_max_ansatz_layers(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: Config = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Load .env file if it exists
    /// 3. Apply environment variable overrides
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        let config = config.merge_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Merge `QMCP_*` variables from `lookup` into this configuration.
    ///
    /// Only variables that are set override the file-loaded (or default)
    /// values. A set but unparsable number is an error.
    pub fn merge_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        fn parsed<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
            value.trim().parse().map_err(|_| {
                ConfigError::ParseError(format!("{key}: cannot parse '{value}'"))
            })
        }

        if let Some(v) = lookup("QMCP_SERVER_NAME") {
            self.server.name = v;
        }

        if let Some(v) = lookup("QMCP_MAX_QUBITS") {
            self.simulator.max_qubits = parsed("QMCP_MAX_QUBITS", v)?;
        }
        if let Some(v) = lookup("QMCP_MAX_SHOTS") {
            self.simulator.max_shots = parsed("QMCP_MAX_SHOTS", v)?;
        }
        if let Some(v) = lookup("QMCP_DEFAULT_SHOTS") {
            self.simulator.default_shots = parsed("QMCP_DEFAULT_SHOTS", v)?;
        }
        if let Some(v) = lookup("QMCP_SEED") {
            self.simulator.seed = Some(parsed("QMCP_SEED", v)?);
        }
        if let Some(v) = lookup("QMCP_MAX_ANSATZ_QUBITS") {
            self.simulator.max_ansatz_qubits = parsed("QMCP_MAX_ANSATZ_QUBITS", v)?;
        }
        if let Some(v) = lookup("QMCP_MAX_ANSATZ_LAYERS") {
            self.simulator.max_ansatz_layers = parsed("QMCP_MAX_ANSATZ_LAYERS", v)?;
        }

        if let Some(v) = lookup("QMCP_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Some(v) = lookup("QMCP_LOG_FORMAT") {
            self.logging.format = v;
        }

        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "server.name must not be empty".to_string(),
            ));
        }

        if !(1..=MAX_SIMULATED_QUBITS).contains(&self.simulator.max_qubits) {
            return Err(ConfigError::ValidationError(format!(
                "simulator.max_qubits must be between 1 and {MAX_SIMULATED_QUBITS}, got {}",
                self.simulator.max_qubits
            )));
        }

        if self.simulator.max_shots == 0 || self.simulator.default_shots == 0 {
            return Err(ConfigError::ValidationError(
                "shot counts must be greater than 0".to_string(),
            ));
        }
        if self.simulator.default_shots > self.simulator.max_shots {
            return Err(ConfigError::ValidationError(format!(
                "simulator.default_shots ({}) exceeds simulator.max_shots ({})",
                self.simulator.default_shots, self.simulator.max_shots
            )));
        }

        if self.simulator.max_ansatz_qubits == 0 || self.simulator.max_ansatz_layers == 0 {
            return Err(ConfigError::ValidationError(
                "ansatz limits must be greater than 0".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {other}"
                )));
            }
        }

        match self.logging.format.as_str() {
            "console" | "json" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {other}"
                )));
            }
        }

        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.name, "qmcp");
        assert_eq!(config.simulator.max_qubits, 20);
        assert_eq!(config.simulator.default_shots, 1000);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml_ng::from_str("simulator:\n  seed: 42\n").unwrap();
        assert_eq!(config.simulator.seed, Some(42));
        assert_eq!(config.simulator.max_shots, 1_000_000);
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("qmcp-config-{}.yaml", std::process::id()));
        std::fs::write(&path, "server:\n  name: lab\nlogging:\n  format: json\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(config.server.name, "lab");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/qmcp.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .merge_env_from(env(&[
                ("QMCP_MAX_QUBITS", "12"),
                ("QMCP_SEED", "7"),
                ("QMCP_LOG_LEVEL", "debug"),
                ("QMCP_MAX_ANSATZ_LAYERS", "8"),
            ]))
            .unwrap();
        assert_eq!(config.simulator.max_qubits, 12);
        assert_eq!(config.simulator.max_ansatz_layers, 8);
        assert_eq!(config.simulator.max_ansatz_qubits, 256);
        assert_eq!(config.simulator.seed, Some(7));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.simulator.max_shots, 1_000_000);
    }

    #[test]
    fn test_env_parse_failure() {
        let err = Config::default()
            .merge_env_from(env(&[("QMCP_MAX_SHOTS", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.simulator.max_qubits = 64;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulator.default_shots = config.simulator.max_shots + 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulator.max_ansatz_layers = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
