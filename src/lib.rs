//! session-store - server-side session tokens
//!
//! Issues opaque session identifiers, resolves them to users and expires them
//! lazily on lookup. `services::SessionStore` is the entry point; `api` wraps
//! it in an axum router.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
