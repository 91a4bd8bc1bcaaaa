//! Authentication module.
//!
//! This module assembles the OAuth2 resource server that validates bearer
//! tokens on incoming requests.
//!
//! # Pre-conditions
//! - The public key referenced by the configuration must be an RSA key.
//!
//! # Post-conditions
//! - Authentication configuration is immutable once loaded.
//!
//! # Invariants
//! - A `ResourceServer` always holds a loaded key and a repository.

pub mod auth_config;
pub mod crypt_key;
pub mod error;
pub mod factory;
pub mod repository;
pub mod resource_server;

pub use auth_config::{
    ApplicationConfig, AuthConfig, ExtendedKey, PublicKeyConfig, RawAuthenticationConfig,
    RawPublicKey,
};
pub use crypt_key::{CryptKey, KeySource};
pub use error::{InvalidConfigError, KeyError};
pub use factory::ResourceServerFactory;
pub use repository::{AccessTokenRepository, InMemoryAccessTokenRepository};
pub use resource_server::{AuthenticatedToken, ResourceServer, TokenValidationError};
