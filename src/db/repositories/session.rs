//! Session repository
//!
//! Database access for the `sessions` relation:
//! - `SessionRepository` trait
//! - `SqlxSessionRepository` for SQLite and MySQL
//!
//! Every operation acquires its own pooled connection and releases it on
//! return, including when the query fails. Expiry policy lives in
//! `services::session`; this layer only stores and fetches rows.

use crate::db::repositories::user::{row_to_user_mysql, row_to_user_sqlite};
use crate::db::DynDatabasePool;
use crate::models::{Session, SessionUser};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session row
    async fn insert(&self, session: &Session) -> Result<()>;

    /// Fetch a session joined with its user
    async fn find_with_user(&self, id: &str) -> Result<Option<SessionUser>>;

    /// Delete a session row, returning the number of rows removed (0 or 1)
    async fn delete(&self, id: &str) -> Result<u64>;
}

/// SQLx-based session repository
pub struct SqlxSessionRepository {
    pool: DynDatabasePool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn insert(&self, session: &Session) -> Result<()> {
        if let Some(pool) = self.pool.as_sqlite() {
            insert_session_sqlite(pool, session).await
        } else if let Some(pool) = self.pool.as_mysql() {
            insert_session_mysql(pool, session).await
        } else {
            unsupported(&self.pool)
        }
    }

    async fn find_with_user(&self, id: &str) -> Result<Option<SessionUser>> {
        if let Some(pool) = self.pool.as_sqlite() {
            find_session_user_sqlite(pool, id).await
        } else if let Some(pool) = self.pool.as_mysql() {
            find_session_user_mysql(pool, id).await
        } else {
            unsupported(&self.pool)
        }
    }

    async fn delete(&self, id: &str) -> Result<u64> {
        if let Some(pool) = self.pool.as_sqlite() {
            delete_session_sqlite(pool, id).await
        } else if let Some(pool) = self.pool.as_mysql() {
            delete_session_mysql(pool, id).await
        } else {
            unsupported(&self.pool)
        }
    }
}

fn unsupported<T>(pool: &DynDatabasePool) -> Result<T> {
    anyhow::bail!("Unsupported database pool for driver {:?}", pool.driver())
}

const INSERT_SESSION: &str =
    "INSERT INTO sessions (session_id, user_id, expires_at) VALUES (?, ?, ?)";

const SELECT_SESSION_USER: &str = r#"
    SELECT users.id AS id, users.username AS username, users.email AS email,
           users.password_hash AS password_hash, users.display_name AS display_name,
           users.created_at AS created_at, sessions.expires_at AS expires_at
    FROM sessions
    JOIN users ON users.id = sessions.user_id
    WHERE sessions.session_id = ?
"#;

const DELETE_SESSION: &str = "DELETE FROM sessions WHERE session_id = ?";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn insert_session_sqlite(pool: &SqlitePool, session: &Session) -> Result<()> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    sqlx::query(INSERT_SESSION)
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .execute(&mut *conn)
        .await
        .context("Failed to create session")?;

    Ok(())
}

async fn find_session_user_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<SessionUser>> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let row = sqlx::query(SELECT_SESSION_USER)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to get session")?;

    match row {
        Some(row) => Ok(Some(SessionUser {
            user: row_to_user_sqlite(&row)?,
            expires_at: row.try_get("expires_at")?,
        })),
        None => Ok(None),
    }
}

async fn delete_session_sqlite(pool: &SqlitePool, id: &str) -> Result<u64> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let result = sqlx::query(DELETE_SESSION)
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("Failed to delete session")?;

    Ok(result.rows_affected())
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn insert_session_mysql(pool: &MySqlPool, session: &Session) -> Result<()> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    sqlx::query(INSERT_SESSION)
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .execute(&mut *conn)
        .await
        .context("Failed to create session")?;

    Ok(())
}

async fn find_session_user_mysql(pool: &MySqlPool, id: &str) -> Result<Option<SessionUser>> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let row = sqlx::query(SELECT_SESSION_USER)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to get session")?;

    match row {
        Some(row) => Ok(Some(SessionUser {
            user: row_to_user_mysql(&row)?,
            expires_at: row.try_get("expires_at")?,
        })),
        None => Ok(None),
    }
}

async fn delete_session_mysql(pool: &MySqlPool, id: &str) -> Result<u64> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let result = sqlx::query(DELETE_SESSION)
        .bind(id)
        .execute(&mut *conn)
        .await
        .context("Failed to delete session")?;

    Ok(result.rows_affected())
}
