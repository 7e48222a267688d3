//! Services layer
//!
//! - `session`: the session store (create / resolve / delete)
//! - `clock`: time source used for expiry
//! - `user` and `password`: credentials for the login endpoint

pub mod clock;
pub mod password;
pub mod session;
pub mod user;

pub use clock::{Clock, ManualClock, SystemClock};
pub use password::{hash_password, verify_password};
pub use session::{SessionStore, SESSION_DURATION_SECS};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
