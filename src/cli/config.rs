// Server Configuration Module
// Handles configuration from files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the listen port
pub const ENV_PORT: &str = "PORT";
/// Environment variable holding the bind host
pub const ENV_HOST: &str = "HOST";
/// Environment variable toggling verbose logging
pub const ENV_VERBOSE: &str = "VERBOSE";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub speed: SpeedConfig,
    #[serde(default)]
    pub quotes: QuotesConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server.host must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `PORT`, `HOST` and `VERBOSE` from the process environment.
    ///
    /// Returns warnings for malformed values; those are ignored and the
    /// current value is kept. Logging is not set up yet when this runs, so
    /// the caller reports them.
    pub fn apply_env(&mut self) -> Vec<String> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::apply_env`] with an explicit variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();

        if let Some(raw) = lookup(ENV_PORT) {
            match raw.trim().parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => warnings.push(format!(
                    "Ignoring {}={:?}: not a valid port, using {}",
                    ENV_PORT, raw, self.server.port
                )),
            }
        }

        if let Some(raw) = lookup(ENV_HOST) {
            if raw.trim().is_empty() {
                warnings.push(format!(
                    "Ignoring empty {}, using {}",
                    ENV_HOST, self.server.host
                ));
            } else {
                self.server.host = raw.trim().to_string();
            }
        }

        if let Some(raw) = lookup(ENV_VERBOSE) {
            match parse_bool(&raw) {
                Some(verbose) => self.logging.verbose = verbose,
                None => warnings.push(format!(
                    "Ignoring {}={:?}: not a boolean, using {}",
                    ENV_VERBOSE, raw, self.logging.verbose
                )),
            }
        }

        warnings
    }

    /// Default log filter directive for the configured verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.logging.verbose {
            "quotesim=debug,tower_http=debug"
        } else {
            "quotesim=info"
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Server network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Debug level logging for sessions and HTTP traffic
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    /// Emit logs as JSON lines
    #[serde(default)]
    pub json: bool,
}

fn default_verbose() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            verbose: default_verbose(),
            json: false,
        }
    }
}

/// Speed table configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpeedConfig {
    /// Draw new randomized delays for every session instead of once at startup
    #[serde(default)]
    pub reroll_randomized: bool,
}

/// Quote pool configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuotesConfig {
    /// Seed for the quote source, for a reproducible pool
    pub seed: Option<u64>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(String),
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Validation(String),
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
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.logging.verbose);
        assert!(!config.logging.json);
        assert!(!config.speed.reroll_randomized);
        assert_eq!(config.quotes.seed, None);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
server:
  port: 9000
  host: "127.0.0.1"

logging:
  verbose: false
  json: true

speed:
  reroll_randomized: true

quotes:
  seed: 42
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.logging.verbose);
        assert!(config.logging.json);
        assert!(config.speed.reroll_randomized);
        assert_eq!(config.quotes.seed, Some(42));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [not, a, map]").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = Config::from_yaml("server:\n  host: \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        let warnings =
            config.apply_env_with(env(&[("PORT", "9090"), ("VERBOSE", "false"), ("HOST", "::1")]));

        assert!(warnings.is_empty());
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "::1");
        assert!(!config.logging.verbose);
    }

    #[test]
    fn test_malformed_env_falls_back() {
        let mut config = Config::default();
        let warnings = config.apply_env_with(env(&[("PORT", "eighty"), ("VERBOSE", "maybe")]));

        assert_eq!(warnings.len(), 2);
        assert_eq!(config.server.port, 8080);
        assert!(config.logging.verbose);
    }

    #[test]
    fn test_missing_env_keeps_values() {
        let mut config = Config::from_yaml("server:\n  port: 7000\n").unwrap();
        let warnings = config.apply_env_with(env(&[]));

        assert!(warnings.is_empty());
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn test_log_filter() {
        let mut config = Config::default();
        assert!(config.log_filter().contains("debug"));
        config.logging.verbose = false;
        assert_eq!(config.log_filter(), "quotesim=info");
    }
}
