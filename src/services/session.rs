//! Session store
//!
//! Issues opaque session identifiers, resolves them to users and removes
//! them. Expiry is lazy: an expired row is deleted by the `resolve` call that
//! finds it, and nothing sweeps the table in the background.
//!
//! Lifecycle of one identifier:
//!
//! ```text
//! nonexistent --create--> active --resolve (expired)--> deleted
//!                           |  ^                           ^
//!                           +--+ resolve (valid)           |
//!                           +-----------delete-------------+
//! ```
//!
//! There is no transition back to active. Calls share no in-memory state, so
//! a `resolve` racing a `delete` may both see the row; `delete` tolerates a
//! missing row, which makes that race harmless.

use anyhow::{Context, Result};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::repositories::SessionRepository;
use crate::models::{Session, User};
use crate::services::clock::{Clock, SystemClock};

/// Default session lifetime: 7 days
pub const SESSION_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

/// Longest lifetime a deployment may configure: 10 years
pub const MAX_SESSION_DURATION_SECS: i64 = 10 * 365 * 24 * 60 * 60;

/// Session lifecycle operations over a `SessionRepository`
pub struct SessionStore {
    repo: Arc<dyn SessionRepository>,
    clock: Arc<dyn Clock>,
    duration_secs: i64,
}

impl SessionStore {
    /// Create a store on the wall clock with the default lifetime
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    /// Create a store with an explicit time source
    pub fn with_clock(repo: Arc<dyn SessionRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            duration_secs: SESSION_DURATION_SECS,
        }
    }

    /// Override the lifetime given to sessions created from now on
    pub fn with_duration(mut self, duration_secs: i64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    pub fn duration_secs(&self) -> i64 {
        self.duration_secs
    }

    /// Issue a new session for `user_id` and return its identifier.
    ///
    /// The identifier is a random UUID v4. It is not checked against existing
    /// rows; a collision surfaces as a primary-key error from storage.
    pub async fn create(&self, user_id: i64) -> Result<String> {
        let now = self.clock.now();
        let expires_at = now.checked_add(self.duration_secs).with_context(|| {
            format!(
                "Session expiry overflows: now {} + duration {}",
                now, self.duration_secs
            )
        })?;
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id,
            expires_at,
        };

        self.repo.insert(&session).await?;

        tracing::debug!(
            user_id,
            session = token_prefix(&session.id),
            expires_at = session.expires_at,
            "Session created"
        );
        Ok(session.id)
    }

    /// Resolve a session identifier to its user.
    ///
    /// Returns `None` when no session matches, and also when the session has
    /// expired, in which case the row is deleted first. Callers cannot tell
    /// the two apart.
    pub async fn resolve(&self, session_id: &str) -> Result<Option<User>> {
        let found = match self.repo.find_with_user(session_id).await? {
            Some(found) => found,
            None => return Ok(None),
        };

        if found.is_expired_at(self.clock.now()) {
            self.repo.delete(session_id).await?;
            tracing::debug!(
                session = token_prefix(session_id),
                expires_at = found.expires_at,
                "Expired session removed on lookup"
            );
            return Ok(None);
        }

        Ok(Some(found.user))
    }

    /// Delete a session. Deleting an unknown identifier is not an error.
    pub async fn delete(&self, session_id: &str) -> Result<()> {
        let removed = self.repo.delete(session_id).await?;
        tracing::debug!(session = token_prefix(session_id), removed, "Session deleted");
        Ok(())
    }
}

/// Leading characters of a token, enough to correlate log lines
fn token_prefix(token: &str) -> &str {
    token.get(..8).unwrap_or(token)
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::db::repositories::SqlxSessionRepository;
    use crate::db::{create_test_pool, migrations};
    use crate::services::clock::ManualClock;
    use proptest::prelude::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("Failed to build runtime")
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Identifiers that were never issued never resolve, and resolving
        /// them leaves the table untouched
        #[test]
        fn never_created_tokens_resolve_absent(ids in prop::collection::vec("[A-Za-z0-9-]{0,40}", 1..8)) {
            runtime().block_on(async {
                let pool = create_test_pool().await.unwrap();
                migrations::run_migrations(&pool).await.unwrap();
                let store = SessionStore::new(SqlxSessionRepository::boxed(pool.clone()));

                for id in &ids {
                    assert!(store.resolve(id).await.unwrap().is_none());
                    store.delete(id).await.unwrap();
                }
            });
        }

        /// A session resolves exactly while elapsed time is within its lifetime
        #[test]
        fn session_resolves_iff_not_past_expiry(
            duration in 1i64..=SESSION_DURATION_SECS,
            elapsed in 0i64..=2 * SESSION_DURATION_SECS,
        ) {
            runtime().block_on(async {
                let pool = create_test_pool().await.unwrap();
                migrations::run_migrations(&pool).await.unwrap();
                sqlx::query("INSERT INTO users (id, username, email, password_hash, created_at) VALUES (1, 'p', 'p@example.com', 'h', ?)")
                    .bind(chrono::Utc::now())
                    .execute(pool.as_sqlite().unwrap())
                    .await
                    .unwrap();

                let clock = Arc::new(ManualClock::new(1_000));
                let store = SessionStore::with_clock(SqlxSessionRepository::boxed(pool.clone()), clock.clone())
                    .with_duration(duration);

                let token = store.create(1).await.unwrap();
                clock.advance(elapsed);

                let resolved = store.resolve(&token).await.unwrap();
                assert_eq!(resolved.is_some(), elapsed <= duration);
            });
        }
    }
}
