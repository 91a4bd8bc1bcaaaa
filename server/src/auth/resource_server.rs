//! The OAuth2 resource server.
//!
//! Validates bearer tokens signed with RS256 against the configured public
//! key and checks them for revocation in the access token repository.
//!
//! # Pre-conditions
//! - The `CryptKey` holds a valid RSA public key.
//!
//! # Post-conditions
//! - On success, returns the token identity and scopes.
//! - On failure, returns a descriptive error indicating what went wrong.
//!
//! # Invariants
//! - The resource server is immutable after construction.
//! - Validation never mutates the repository.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, Validation, decode};
use serde::Deserialize;

use super::{AccessTokenRepository, CryptKey};

/// The `aud` claim, which may be a single value or a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Audience {
    Single(String),
    Many(Vec<String>),
}

/// Claims read from an access token.
#[derive(Debug, Clone, Deserialize)]
struct Claims {
    #[serde(default)]
    jti: Option<String>,
    #[serde(default)]
    aud: Option<Audience>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    scopes: Vec<String>,
}

/// The identity carried by a validated access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedToken {
    /// The token identifier (`jti`).
    pub access_token_id: String,
    /// The client the token was issued to (`aud`).
    pub client_id: Option<String>,
    /// The resource owner (`sub`); absent for client credentials tokens.
    pub user_id: Option<String>,
    /// The scopes granted to the token.
    pub scopes: Vec<String>,
}

/// Error returned when a bearer token is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    /// The request has no `Authorization` header.
    MissingAuthorizationHeader,
    /// The token is malformed or cannot be parsed.
    MalformedToken,
    /// The token signature does not match the public key.
    InvalidSignature,
    /// The token has expired.
    TokenExpired,
    /// The token is not valid yet (`nbf` is in the future).
    TokenNotYetValid,
    /// The token has no `jti` claim.
    MissingTokenId,
    /// The token has been revoked.
    TokenRevoked,
}

impl std::fmt::Display for TokenValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAuthorizationHeader => write!(f, "missing Authorization header"),
            Self::MalformedToken => write!(f, "malformed access token"),
            Self::InvalidSignature => write!(f, "access token could not be verified"),
            Self::TokenExpired => write!(f, "access token has expired"),
            Self::TokenNotYetValid => write!(f, "access token is not valid yet"),
            Self::MissingTokenId => write!(f, "missing 'jti' claim in access token"),
            Self::TokenRevoked => write!(f, "access token has been revoked"),
        }
    }
}

impl std::error::Error for TokenValidationError {}

/// Validates bearer tokens on incoming requests.
///
/// Cheap to share: wrap it in an `Arc` and validate from any thread.
#[derive(Clone)]
pub struct ResourceServer {
    public_key: CryptKey,
    repository: Arc<dyn AccessTokenRepository>,
}

impl std::fmt::Debug for ResourceServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceServer")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl ResourceServer {
    /// Create a resource server from a loaded key and a repository.
    #[must_use]
    pub const fn new(public_key: CryptKey, repository: Arc<dyn AccessTokenRepository>) -> Self {
        Self {
            public_key,
            repository,
        }
    }

    /// The public key used to verify token signatures.
    #[must_use]
    pub const fn public_key(&self) -> &CryptKey {
        &self.public_key
    }

    /// The repository consulted for revocation.
    #[must_use]
    pub const fn repository(&self) -> &Arc<dyn AccessTokenRepository> {
        &self.repository
    }

    /// Validate the value of an `Authorization` header.
    ///
    /// # Errors
    /// Returns `TokenValidationError::MissingAuthorizationHeader` if `header`
    /// is `None`, otherwise any error from `validate_bearer_token`.
    pub fn validate_authorization_header(
        &self,
        header: Option<&str>,
    ) -> Result<AuthenticatedToken, TokenValidationError> {
        let Some(header) = header else {
            tracing::debug!("rejected request without Authorization header");
            return Err(TokenValidationError::MissingAuthorizationHeader);
        };

        let header = header.trim_start();
        let token = header.strip_prefix("Bearer ").unwrap_or(header).trim();

        self.validate_bearer_token(token)
    }

    /// Validate a raw bearer token.
    ///
    /// Checks the RS256 signature, `exp` and `nbf`, then asks the repository
    /// whether the token has been revoked.
    ///
    /// # Errors
    /// Returns `TokenValidationError` describing why the token was rejected.
    pub fn validate_bearer_token(
        &self,
        token: &str,
    ) -> Result<AuthenticatedToken, TokenValidationError> {
        if token.is_empty() {
            tracing::debug!("rejected empty bearer token");
            return Err(TokenValidationError::MalformedToken);
        }

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_nbf = true;
        validation.validate_aud = false;

        let token_data = decode::<Claims>(token, self.public_key.decoding_key(), &validation)
            .map_err(|e| {
                let error = map_jwt_error(&e);
                tracing::debug!(error = %error, "rejected bearer token");
                error
            })?;
        let claims = token_data.claims;

        let access_token_id = claims
            .jti
            .filter(|jti| !jti.is_empty())
            .ok_or(TokenValidationError::MissingTokenId)?;

        if self.repository.is_access_token_revoked(&access_token_id) {
            tracing::debug!(access_token_id = %access_token_id, "rejected revoked bearer token");
            return Err(TokenValidationError::TokenRevoked);
        }

        let client_id = claims.aud.and_then(|aud| match aud {
            Audience::Single(client_id) => Some(client_id),
            Audience::Many(client_ids) => client_ids.into_iter().next(),
        });

        tracing::trace!(access_token_id = %access_token_id, "accepted bearer token");

        Ok(AuthenticatedToken {
            access_token_id,
            client_id,
            user_id: claims.sub.filter(|sub| !sub.is_empty()),
            scopes: claims.scopes,
        })
    }
}

/// Maps jsonwebtoken errors to our `TokenValidationError` type.
fn map_jwt_error(error: &jsonwebtoken::errors::Error) -> TokenValidationError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => TokenValidationError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenValidationError::TokenExpired,
        ErrorKind::ImmatureSignature => TokenValidationError::TokenNotYetValid,
        _ => TokenValidationError::MalformedToken,
    }
}
