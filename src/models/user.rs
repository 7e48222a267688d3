//! User model
//!
//! Users are owned by the account side of the application. The session store
//! only reads them, through the join on `sessions.user_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Login name (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2 PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Optional name shown instead of the username
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user that has not been stored yet.
    ///
    /// The password must already be hashed, see `services::password`.
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: 0, // assigned by the database
            username,
            email,
            password_hash,
            display_name: None,
            created_at: Utc::now(),
        }
    }
}
