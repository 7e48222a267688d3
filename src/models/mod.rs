//! Data models
//!
//! Plain record types for the two relations this crate touches: `users` and
//! `sessions`.

mod session;
mod user;

pub use session::{Session, SessionUser};
pub use user::User;
