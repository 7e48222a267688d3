//! Session model

use super::User;

/// A row of the `sessions` relation.
///
/// Rows are only ever inserted and deleted; there is no in-place update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque session identifier (hyphenated UUID v4)
    pub id: String,
    /// Owning user
    pub user_id: i64,
    /// Absolute expiry as UNIX seconds
    pub expires_at: i64,
}

/// A session row joined with its user
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user: User,
    pub expires_at: i64,
}

impl SessionUser {
    /// Expired once `now` is strictly past `expires_at`
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at < now
    }
}
