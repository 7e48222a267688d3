//! Database layer
//!
//! - `pool`: the connection provider (SQLite by default, MySQL optional)
//! - `migrations`: embedded schema for `users` and `sessions`
//! - `repositories`: per-relation data access
//!
//! ```ignore
//! use session_store::config::DatabaseConfig;
//! use session_store::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
