//! Revocation registry trait, the seam for swapping the backing store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::DomainError;

/// Set of revoked tokens with per-entry expiry.
///
/// Implementations key entries by [`fingerprint`](crate::domain::fingerprint)
/// of the raw token and must be safe for concurrent use. An entry whose
/// `expires_at` has passed must read as not revoked even before `sweep`
/// removes it.
///
/// A networked backend maps onto `set(fingerprint, ttl)` for `revoke`,
/// `exists(fingerprint)` for `is_revoked`, and native key expiry (or
/// `delete`) for `sweep`.
#[async_trait]
pub trait RevocationRegistry: Send + Sync {
    /// Record `token` as revoked until `expires_at`
    ///
    /// Revoking the same token again overwrites the previous entry.
    async fn revoke(
        &self,
        token: &str,
        owner_user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Revoke `token` only if it is not already revoked
    ///
    /// # Returns
    /// * `Ok(true)` - This call revoked the token
    /// * `Ok(false)` - A live entry already existed; nothing changed
    ///
    /// The default implementation is a lookup followed by `revoke` and is not
    /// atomic. Stores that can check-and-set in one step should override it.
    async fn try_revoke(
        &self,
        token: &str,
        owner_user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        if self.is_revoked(token).await? {
            return Ok(false);
        }
        self.revoke(token, owner_user_id, expires_at).await?;
        Ok(true)
    }

    /// Check if `token` is currently revoked
    async fn is_revoked(&self, token: &str) -> Result<bool, DomainError>;

    /// Delete every entry whose expiry has passed
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of entries removed
    async fn sweep(&self) -> Result<usize, DomainError>;

    /// Number of entries currently held, expired or not
    async fn size(&self) -> Result<usize, DomainError>;
}
