//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value for {}: '{}'", var, value)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: defaults, then the optional TOML file, then the
/// process environment. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match path {
        Some(path) => parse_file(path)?,
        None => AppConfig::default(),
    };

    let config = apply_env(config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests need not mutate process state.
pub fn apply_env<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("DB_HOST") {
        config.database.host = v;
    }
    if let Some(v) = lookup("DB_NAME") {
        config.database.name = v;
    }
    if let Some(v) = lookup("DB_USER") {
        config.database.user = v;
    }
    if let Some(v) = lookup("DB_PASSWORD") {
        config.database.password = v;
    }
    if let Some(v) = lookup("DB_PORT") {
        config.database.port = parse_var("DB_PORT", v)?;
    }
    if let Some(v) = lookup("STORE_BACKEND") {
        config.database.backend = parse_var("STORE_BACKEND", v)?;
    }
    if let Some(v) = lookup("PORT") {
        config.listener.port = parse_var("PORT", v)?;
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = lookup("LOG_FORMAT") {
        config.observability.log_format = parse_var("LOG_FORMAT", v)?;
    }
    if let Some(v) = lookup("METRICS_ENABLED") {
        config.observability.metrics_enabled = parse_var("METRICS_ENABLED", v)?;
    }
    if let Some(v) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = v;
    }

    Ok(config)
}

fn parse_var<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}
