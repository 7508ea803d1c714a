//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `NUTRIFLEX_*` environment variable overrides.

use crate::scoring::ScoringRules;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub scoring: ScoringRules,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where tracker state lives on disk
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("nutriflex").to_string_lossy().to_string())
        .unwrap_or_else(|| "./nutriflex_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Invalid(error) => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse TOML content
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            std::env::var("NUTRIFLEX_CONFIG").ok().map(PathBuf::from),
            dirs::config_dir().map(|p| p.join("nutriflex").join("config.toml")),
            Some(PathBuf::from("./nutriflex.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Reject rule sets that make scores meaningless
    fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.scoring;
        if rules.score_impact_min > rules.score_impact_max {
            return Err(ConfigError::Invalid(format!(
                "scoring.score_impact_min ({}) is above score_impact_max ({})",
                rules.score_impact_min, rules.score_impact_max
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(data_dir) = var("NUTRIFLEX_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        if let Some(host) = var("NUTRIFLEX_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("NUTRIFLEX_API_PORT") {
            match port.parse() {
                Ok(p) => self.api.port = p,
                Err(_) => tracing::warn!("Ignoring invalid NUTRIFLEX_API_PORT: {}", port),
            }
        }

        if let Some(level) = var("NUTRIFLEX_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("NUTRIFLEX_LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(file) = var("NUTRIFLEX_LOG_FILE") {
            self.logging.file = Some(file);
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# NutriFlex Configuration
#
# Environment variables override these settings:
# - NUTRIFLEX_DATA_DIR
# - NUTRIFLEX_API_HOST
# - NUTRIFLEX_API_PORT
# - NUTRIFLEX_LOG_LEVEL
# - NUTRIFLEX_LOG_FORMAT
# - NUTRIFLEX_LOG_FILE

[storage]
# Directory holding one JSON file per collection
data_dir = "~/.local/share/nutriflex"

[api]
host = "127.0.0.1"
port = 8086

# Allowed CORS origins (empty = any)
cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173"]

# Request timeout in seconds
request_timeout_secs = 30

[scoring]
# XP for completed meals without an explicit score
healthy_meal_xp = 100
unhealthy_meal_xp = -50
nutrition_goal = 500

xp_per_exercise_minute = 5
exercise_goal = 300

xp_per_water_cup = 25
hydration_goal = 200
daily_cup_goal = 8

# Range advisory score impacts are clamped into
score_impact_min = -100
score_impact_max = 150

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/nutriflex/nutriflex.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();

        assert_eq!(config.api.port, 8086);
        assert_eq!(config.scoring, ScoringRules::default());
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::parse("[api]\nport = 9000\n[scoring]\nexercise_goal = 600\n").unwrap();

        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.scoring.exercise_goal, 600);
        assert_eq!(config.scoring.nutrition_goal, 500);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(
            Config::parse("[scoring]\nscore_impact_min = 10\nscore_impact_max = 5\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(Config::parse("[logging]\nformat = \"xml\"\n").is_err());
        assert!(Config::parse("not = [toml").is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nutriflex.toml");
        std::fs::write(&path, "[api\n").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("NUTRIFLEX_DATA_DIR", "/tmp/nf"),
            ("NUTRIFLEX_API_PORT", "not-a-port"),
            ("NUTRIFLEX_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/tmp/nf");
        assert_eq!(config.api.port, 8086);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_data_path_expands_home() {
        let storage = StorageConfig {
            data_dir: "/var/lib/nutriflex".to_string(),
        };
        assert_eq!(storage.data_path(), PathBuf::from("/var/lib/nutriflex"));
    }
}
