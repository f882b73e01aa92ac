pub mod password;
pub mod sessions;

pub use sessions::{SessionStore, SESSION_COOKIE};
