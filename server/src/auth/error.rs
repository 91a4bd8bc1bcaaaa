//! Errors raised while assembling and using the resource server.
//!
//! Configuration problems are all reported through `InvalidConfigError`.
//! They are deterministic and meant to abort startup, never to be retried.

use std::path::PathBuf;

/// Error returned when the public key cannot be loaded.
#[derive(Debug)]
pub enum KeyError {
    /// The key file does not exist.
    NotFound(PathBuf),
    /// The key file exists but could not be read.
    Io {
        /// Path of the key file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The key material is not a valid PEM-encoded RSA public key.
    InvalidPem(String),
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "key file '{}' does not exist", path.display()),
            Self::Io { path, source } => {
                write!(f, "failed to read key file '{}': {source}", path.display())
            }
            Self::InvalidPem(reason) => write!(f, "invalid RSA public key: {reason}"),
        }
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::NotFound(_) | Self::InvalidPem(_) => None,
        }
    }
}

/// Error returned when the authentication configuration is unusable.
///
/// Every variant is the same kind of failure: an operator has to fix the
/// configuration before the resource server can be built.
#[derive(Debug)]
pub enum InvalidConfigError {
    /// No `authentication` section was provided.
    MissingAuthentication,
    /// The `authentication` section has no `public_key` entry.
    MissingPublicKey,
    /// No access token repository was supplied.
    MissingAccessTokenRepository,
    /// An extended key record has no `key_or_path`.
    MissingKeyOrPath,
    /// The public key could not be loaded.
    InvalidKey(KeyError),
    /// The configuration file could not be read.
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Description of the I/O failure.
        message: String,
    },
    /// The configuration could not be parsed.
    Parse(String),
}

impl std::fmt::Display for InvalidConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAuthentication => write!(f, "missing authentication configuration"),
            Self::MissingPublicKey => {
                write!(f, "authentication configuration missing public_key")
            }
            Self::MissingAccessTokenRepository => {
                write!(f, "no access token repository registered")
            }
            Self::MissingKeyOrPath => {
                write!(f, "extended key configuration missing key_or_path")
            }
            Self::InvalidKey(e) => write!(f, "invalid public key: {e}"),
            Self::Read { path, message } => write!(
                f,
                "failed to read configuration file '{}': {message}",
                path.display()
            ),
            Self::Parse(reason) => write!(f, "failed to parse configuration: {reason}"),
        }
    }
}

impl std::error::Error for InvalidConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidKey(e) => Some(e),
            _ => None,
        }
    }
}

impl From<KeyError> for InvalidConfigError {
    fn from(e: KeyError) -> Self {
        Self::InvalidKey(e)
    }
}
