//! User repository
//!
//! Database access for the `users` relation:
//! - `UserRepository` trait
//! - `SqlxUserRepository` for SQLite and MySQL

use crate::db::DynDatabasePool;
use crate::models::User;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user, returning it with its assigned id
    async fn create(&self, user: &User) -> Result<User>;

    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// SQLx-based user repository
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        if let Some(pool) = self.pool.as_sqlite() {
            create_user_sqlite(pool, user).await
        } else if let Some(pool) = self.pool.as_mysql() {
            create_user_mysql(pool, user).await
        } else {
            unsupported(&self.pool)
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        if let Some(pool) = self.pool.as_sqlite() {
            get_user_sqlite(pool, "id = ?", UserKey::Id(id)).await
        } else if let Some(pool) = self.pool.as_mysql() {
            get_user_mysql(pool, "id = ?", UserKey::Id(id)).await
        } else {
            unsupported(&self.pool)
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        if let Some(pool) = self.pool.as_sqlite() {
            get_user_sqlite(pool, "username = ?", UserKey::Username(username)).await
        } else if let Some(pool) = self.pool.as_mysql() {
            get_user_mysql(pool, "username = ?", UserKey::Username(username)).await
        } else {
            unsupported(&self.pool)
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        if let Some(pool) = self.pool.as_sqlite() {
            get_user_sqlite(pool, "email = ?", UserKey::Email(email)).await
        } else if let Some(pool) = self.pool.as_mysql() {
            get_user_mysql(pool, "email = ?", UserKey::Email(email)).await
        } else {
            unsupported(&self.pool)
        }
    }
}

fn unsupported<T>(pool: &DynDatabasePool) -> Result<T> {
    anyhow::bail!("Unsupported database pool for driver {:?}", pool.driver())
}

/// Lookup key bound into the WHERE clause
enum UserKey<'a> {
    Id(i64),
    Username(&'a str),
    Email(&'a str),
}

const USER_COLUMNS: &str = "id, username, email, password_hash, display_name, created_at";

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, display_name, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.display_name)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        ..user.clone()
    })
}

async fn get_user_sqlite(pool: &SqlitePool, filter: &str, key: UserKey<'_>) -> Result<Option<User>> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let sql = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, filter);
    let query = match key {
        UserKey::Id(id) => sqlx::query(&sql).bind(id),
        UserKey::Username(username) => sqlx::query(&sql).bind(username),
        UserKey::Email(email) => sqlx::query(&sql).bind(email),
    };
    let row = query
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to get user")?;

    row.as_ref().map(row_to_user_sqlite).transpose()
}

pub(crate) fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, display_name, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.display_name)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        ..user.clone()
    })
}

async fn get_user_mysql(pool: &MySqlPool, filter: &str, key: UserKey<'_>) -> Result<Option<User>> {
    let mut conn = pool.acquire().await.context("Failed to acquire connection")?;

    let sql = format!("SELECT {} FROM users WHERE {}", USER_COLUMNS, filter);
    let query = match key {
        UserKey::Id(id) => sqlx::query(&sql).bind(id),
        UserKey::Username(username) => sqlx::query(&sql).bind(username),
        UserKey::Email(email) => sqlx::query(&sql).bind(email),
    };
    let row = query
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to get user")?;

    row.as_ref().map(row_to_user_mysql).transpose()
}

pub(crate) fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        created_at: row.try_get("created_at")?,
    })
}
