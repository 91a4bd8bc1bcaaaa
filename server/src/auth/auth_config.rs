//! Authentication configuration for the resource server.
//!
//! Configuration arrives in a loose shape (`RawAuthenticationConfig`) where
//! `public_key` is either a plain string or a record. It is validated once
//! into `AuthConfig` before any key material is touched.
//!
//! # Pre-conditions
//! - The raw configuration has been deserialized (from TOML or built in code).
//!
//! # Post-conditions
//! - `AuthConfig` instances are immutable once created.
//!
//! # Invariants
//! - `PublicKeyConfig::Extended` always carries a non-empty `key_or_path`.
//! - `key_permissions_check` is `true` unless explicitly disabled.

use serde::Deserialize;

use super::InvalidConfigError;

/// Root of the application configuration.
///
/// Only the `authentication` section is read; other sections are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationConfig {
    /// The `authentication` section, if present.
    #[serde(default)]
    pub authentication: Option<RawAuthenticationConfig>,
}

impl ApplicationConfig {
    /// Parse an application configuration from TOML.
    ///
    /// # Errors
    /// Returns `InvalidConfigError::Parse` if the document is not valid TOML
    /// or `public_key` has neither a string nor a table shape.
    pub fn from_toml_str(content: &str) -> Result<Self, InvalidConfigError> {
        toml::from_str(content).map_err(|e| InvalidConfigError::Parse(e.to_string()))
    }
}

/// The `authentication` section as written by the operator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAuthenticationConfig {
    /// The public key entry, if present.
    #[serde(default)]
    pub public_key: Option<RawPublicKey>,
}

/// The `public_key` entry before validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPublicKey {
    /// A path to the key file, or inline PEM.
    Path(String),
    /// A record with optional pass phrase and permissions switch.
    Extended {
        /// Path to the key file, or inline PEM.
        #[serde(default)]
        key_or_path: Option<String>,
        /// Pass phrase for the key, if it is encrypted.
        #[serde(default)]
        pass_phrase: Option<String>,
        /// Whether the key file permissions are enforced.
        #[serde(default)]
        key_permissions_check: Option<bool>,
    },
}

impl RawPublicKey {
    /// Whether the entry carries nothing: an empty string or a record with no fields set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Path(path) => path.is_empty(),
            Self::Extended {
                key_or_path,
                pass_phrase,
                key_permissions_check,
            } => key_or_path.is_none() && pass_phrase.is_none() && key_permissions_check.is_none(),
        }
    }
}

/// A validated extended key descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    /// Path to the key file, or inline PEM. Never empty.
    pub key_or_path: String,
    /// Pass phrase forwarded to the key loader.
    pub pass_phrase: Option<String>,
    /// Whether the key file permissions are enforced.
    pub key_permissions_check: bool,
}

/// A validated public key descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyConfig {
    /// A plain path (or inline PEM). Permissions are always checked.
    Path(String),
    /// An extended key record.
    Extended(ExtendedKey),
}

impl PublicKeyConfig {
    /// Validate a raw `public_key` entry.
    ///
    /// # Errors
    /// Returns `InvalidConfigError::MissingKeyOrPath` if an extended record
    /// has no `key_or_path` or an empty one.
    pub fn from_raw(raw: &RawPublicKey) -> Result<Self, InvalidConfigError> {
        match raw {
            RawPublicKey::Path(path) => Ok(Self::Path(path.clone())),
            RawPublicKey::Extended {
                key_or_path,
                pass_phrase,
                key_permissions_check,
            } => {
                let key_or_path = key_or_path
                    .as_deref()
                    .filter(|value| !value.is_empty())
                    .ok_or(InvalidConfigError::MissingKeyOrPath)?;

                Ok(Self::Extended(ExtendedKey {
                    key_or_path: key_or_path.to_string(),
                    pass_phrase: pass_phrase.clone(),
                    key_permissions_check: key_permissions_check.unwrap_or(true),
                }))
            }
        }
    }

    /// The path or inline PEM to load.
    #[must_use]
    pub fn key_or_path(&self) -> &str {
        match self {
            Self::Path(path) => path,
            Self::Extended(key) => &key.key_or_path,
        }
    }

    /// The pass phrase, if one was configured.
    #[must_use]
    pub fn pass_phrase(&self) -> Option<&str> {
        match self {
            Self::Path(_) => None,
            Self::Extended(key) => key.pass_phrase.as_deref(),
        }
    }

    /// Whether the key file permissions are enforced.
    #[must_use]
    pub const fn key_permissions_check(&self) -> bool {
        match self {
            Self::Path(_) => true,
            Self::Extended(key) => key.key_permissions_check,
        }
    }
}

/// The validated `authentication` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// The public key used to verify access tokens.
    pub public_key: PublicKeyConfig,
}

impl AuthConfig {
    /// Validate a raw `authentication` section.
    ///
    /// # Errors
    /// Returns `InvalidConfigError::MissingPublicKey` if `public_key` is absent
    /// or empty, or `InvalidConfigError::MissingKeyOrPath` for a malformed
    /// extended key.
    pub fn from_raw(raw: &RawAuthenticationConfig) -> Result<Self, InvalidConfigError> {
        let public_key = raw
            .public_key
            .as_ref()
            .filter(|public_key| !public_key.is_empty())
            .ok_or(InvalidConfigError::MissingPublicKey)?;

        Ok(Self {
            public_key: PublicKeyConfig::from_raw(public_key)?,
        })
    }
}
