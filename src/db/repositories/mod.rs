//! Database repositories
//!
//! One repository per relation. Each hides the SQLite/MySQL split behind a
//! trait so services only see `Arc<dyn ...Repository>`.

pub mod session;
pub mod user;

pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
