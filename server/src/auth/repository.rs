//! Access token repository.
//!
//! The resource server consults the repository to find out whether an
//! otherwise valid token has been revoked.

use std::collections::HashSet;
use std::sync::RwLock;

/// Lookup capability for issued access tokens.
///
/// Implementations are shared between threads behind an `Arc` and must not
/// require mutable access for lookups.
pub trait AccessTokenRepository: Send + Sync {
    /// Returns `true` if the token with the given identifier (`jti`) has been revoked.
    fn is_access_token_revoked(&self, token_id: &str) -> bool;
}

/// An `AccessTokenRepository` that keeps revoked token ids in memory.
///
/// # Thread Safety
///
/// Revoked ids are stored behind an `RwLock`, so concurrent lookups only
/// contend with revocations.
#[derive(Debug, Default)]
pub struct InMemoryAccessTokenRepository {
    revoked: RwLock<HashSet<String>>,
}

impl InMemoryAccessTokenRepository {
    /// Create a repository with no revoked tokens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with the given tokens already revoked.
    #[must_use]
    pub fn with_revoked<I, S>(token_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            revoked: RwLock::new(token_ids.into_iter().map(Into::into).collect()),
        }
    }

    /// Mark a token as revoked.
    ///
    /// # Post-conditions
    /// - `is_access_token_revoked(token_id)` returns `true`.
    pub fn revoke(&self, token_id: &str) {
        match self.revoked.write() {
            Ok(mut revoked) => {
                revoked.insert(token_id.to_string());
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(token_id.to_string());
            }
        }
    }
}

impl AccessTokenRepository for InMemoryAccessTokenRepository {
    fn is_access_token_revoked(&self, token_id: &str) -> bool {
        // A poisoned lock means the set may be incomplete; treat every token as revoked.
        self.revoked
            .read()
            .map_or(true, |revoked| revoked.contains(token_id))
    }
}
