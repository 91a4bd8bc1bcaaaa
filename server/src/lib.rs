// Life of a request:
// 1. Startup reads the authentication config and builds a ResourceServer
// 2. Each request hands its Authorization header to the ResourceServer
// 3. The bearer token is verified against the public key
// 4. The token id is checked against the access token repository
// 5. The caller gets the token's client, user and scopes, or a rejection
//
// System components:
//  - Configuration validation
//  - Public key loading
//  - Token verification and revocation lookup

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod auth;
pub mod config;

#[cfg(test)]
mod testing;

pub use auth::{
    AccessTokenRepository, AuthenticatedToken, InvalidConfigError, ResourceServer,
    ResourceServerFactory,
};
