//! Process configuration module.
//!
//! This module provides configuration loading for the resource server
//! binary from environment variables.
//!
//! # Environment Variables
//!
//! - `RESOURCE_SERVER_CONFIG_FILE`: TOML file with the `authentication` section (required)
//! - `RESOURCE_SERVER_REVOKED_TOKENS`: Comma-separated revoked token ids (default: none)
//!
//! # Invariants
//!
//! - `config_file` is never empty (the file may not exist yet)
//! - `revoked_tokens` never contains empty ids

use std::path::PathBuf;

/// Process configuration.
///
/// # Pre-conditions
///
/// When constructed via `from_env()`:
/// - All required environment variables must be set
///
/// # Post-conditions
///
/// - `config_file` is a non-empty path
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path of the TOML file holding the authentication configuration.
    pub config_file: PathBuf,
    /// Token ids that are revoked at startup.
    pub revoked_tokens: Vec<String>,
}

/// Error returned when the process environment cannot be turned into a `ServerConfig`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The named variable is not set.
    MissingEnvVar(String),
    /// The named variable is set to an unusable value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "{name} is not set; point it at the authentication config file")
            }
            Self::InvalidValue { name, message } => write!(f, "{name} {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ServerConfig {
    /// Name of the variable holding the configuration file path.
    pub const CONFIG_FILE_VAR: &'static str = "RESOURCE_SERVER_CONFIG_FILE";
    /// Name of the variable holding revoked token ids.
    pub const REVOKED_TOKENS_VAR: &'static str = "RESOURCE_SERVER_REVOKED_TOKENS";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `RESOURCE_SERVER_CONFIG_FILE` is not set or is empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as `from_env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_file = Self::load_config_file(&lookup)?;
        let revoked_tokens = Self::load_revoked_tokens(&lookup);

        Ok(Self {
            config_file,
            revoked_tokens,
        })
    }

    /// Load the configuration file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or is empty.
    fn load_config_file<F>(lookup: &F) -> Result<PathBuf, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = lookup(Self::CONFIG_FILE_VAR)
            .ok_or_else(|| ConfigError::MissingEnvVar(Self::CONFIG_FILE_VAR.to_string()))?;

        if path.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::CONFIG_FILE_VAR.to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(PathBuf::from(path))
    }

    /// Load revoked token ids.
    ///
    /// Returns an empty list if not set.
    fn load_revoked_tokens<F>(lookup: &F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(Self::REVOKED_TOKENS_VAR)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
