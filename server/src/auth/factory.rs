//! Resource server factory.
//!
//! Assembles a `ResourceServer` from the application configuration and an
//! access token repository.
//!
//! # Pre-conditions
//! - The caller owns the repository; the factory only clones the `Arc`.
//!
//! # Post-conditions
//! - Either a fully usable `ResourceServer` is returned or an
//!   `InvalidConfigError` explains what the operator has to fix.
//!
//! # Invariants
//! - A `ResourceServer` is never built without a public key and a repository.
//! - The factory holds no state; every call is independent.

use std::path::Path;
use std::sync::Arc;

use super::{
    AccessTokenRepository, ApplicationConfig, AuthConfig, CryptKey, InvalidConfigError,
    ResourceServer,
};

/// Builds `ResourceServer` instances from configuration.
#[derive(Debug)]
pub struct ResourceServerFactory;

impl ResourceServerFactory {
    /// Build a resource server.
    ///
    /// Checks, in order: the `authentication` section, its `public_key`
    /// entry, the repository, and finally the shape of the key descriptor.
    /// The key is only loaded once all of these pass.
    ///
    /// # Errors
    /// Returns `InvalidConfigError` if any check fails or the key cannot be loaded.
    pub fn create(
        config: &ApplicationConfig,
        repository: Option<Arc<dyn AccessTokenRepository>>,
    ) -> Result<ResourceServer, InvalidConfigError> {
        let authentication = config
            .authentication
            .as_ref()
            .ok_or(InvalidConfigError::MissingAuthentication)?;

        if !authentication
            .public_key
            .as_ref()
            .is_some_and(|public_key| !public_key.is_empty())
        {
            return Err(InvalidConfigError::MissingPublicKey);
        }

        let repository = repository.ok_or(InvalidConfigError::MissingAccessTokenRepository)?;

        let auth_config = AuthConfig::from_raw(authentication)?;
        let public_key = CryptKey::load(&auth_config.public_key)?;

        tracing::info!(
            key_permissions_check = auth_config.public_key.key_permissions_check(),
            "resource server created"
        );

        Ok(ResourceServer::new(public_key, repository))
    }

    /// Parse a TOML configuration and build a resource server from it.
    ///
    /// # Errors
    /// Returns `InvalidConfigError::Parse` for malformed TOML, otherwise see `create`.
    pub fn from_toml_str(
        content: &str,
        repository: Option<Arc<dyn AccessTokenRepository>>,
    ) -> Result<ResourceServer, InvalidConfigError> {
        let config = ApplicationConfig::from_toml_str(content)?;
        Self::create(&config, repository)
    }

    /// Read a TOML configuration file and build a resource server from it.
    ///
    /// # Errors
    /// Returns `InvalidConfigError::Read` if the file cannot be read, otherwise
    /// see `from_toml_str`.
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        repository: Option<Arc<dyn AccessTokenRepository>>,
    ) -> Result<ResourceServer, InvalidConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| InvalidConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content, repository)
    }
}
