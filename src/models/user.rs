use serde::{Deserialize, Serialize};
use crate::errors::ValidationErrors;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub username: String,
    pub password_hash: String,  // full bcrypt string, salt included
    pub salt: String,           // bcrypt salt prefix, kept alongside the hash
}

/// Presence is the only rule applied to credentials.
pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new("User");
    if username.is_empty() {
        errors.push("username", "Username is required");
    }
    if password.is_empty() {
        errors.push("password", "Password is required");
    }
    errors.into_result()
}
