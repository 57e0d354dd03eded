mod auth;

pub use auth::{require_auth, Identity, SESSION_KEY};
