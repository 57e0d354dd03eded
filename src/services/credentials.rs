//! User registration and password verification.

use serde_json::json;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use crate::errors::AppResult;
use crate::models::{User, validate_credentials};
use super::document_store::{decode, encode, DocumentStore};

pub const USERS: &str = "users";

// "$2b$" + two-digit cost + "$" + 22 characters of encoded salt
const SALT_PREFIX_LEN: usize = 29;

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn DocumentStore>,
    cost: u32,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn DocumentStore>, cost: u32) -> Self {
        Self { store, cost }
    }

    /// Hashes the password with a fresh salt and persists one user record.
    /// Usernames are not checked for uniqueness.
    pub async fn register(&self, username: &str, password: &str) -> AppResult<User> {
        validate_credentials(username, password)?;

        let plaintext = password.to_string();
        let cost = self.cost;
        let (password_hash, salt) = spawn_blocking(move || hash_password(&plaintext, cost)).await??;

        let mut user = User {
            id: String::new(),
            username: username.to_string(),
            password_hash,
            salt,
        };
        user.id = self.store.insert(USERS, encode(&user)?).await?;

        tracing::info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Checks a password against the first user stored under `username`.
    ///
    /// Unknown users still pay for one hash so the response time does not
    /// reveal which usernames exist.
    pub async fn verify(&self, username: &str, password: &str) -> AppResult<bool> {
        let record = self
            .store
            .find_one(USERS, &json!({ "username": username }))
            .await?;

        let plaintext = password.to_string();
        match record {
            Some(document) => {
                let user: User = decode(document)?;
                let matched = spawn_blocking(move || check_password(&plaintext, &user)).await??;
                tracing::debug!("Password check for {}: {}", username, matched);
                Ok(matched)
            }
            None => {
                let cost = self.cost;
                spawn_blocking(move || bcrypt::hash(plaintext, cost)).await??;
                tracing::debug!("Password check for unknown user {}", username);
                Ok(false)
            }
        }
    }

    /// Replaces the whole users collection with a single account.
    pub async fn seed(&self, username: &str, password: &str) -> AppResult<User> {
        self.store.drop_collection(USERS).await?;
        tracing::info!("Collection {} dropped for seeding", USERS);
        self.register(username, password).await
    }
}

/// Returns the full bcrypt string and the salt prefix embedded in it.
fn hash_password(password: &str, cost: u32) -> Result<(String, String), bcrypt::BcryptError> {
    let hashed = bcrypt::hash(password, cost)?;
    let salt = hashed
        .get(..SALT_PREFIX_LEN)
        .ok_or_else(|| bcrypt::BcryptError::InvalidHash(hashed.clone()))?
        .to_string();
    Ok((hashed, salt))
}

fn check_password(password: &str, user: &User) -> Result<bool, bcrypt::BcryptError> {
    // The stored salt must be the one the hash was computed with.
    if !user.password_hash.starts_with(&user.salt) {
        tracing::warn!("Stored salt does not match hash for user {}", user.username);
        return Ok(false);
    }
    bcrypt::verify(password, &user.password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::services::{document_store::match_all, InMemoryStore};

    // bcrypt's minimum work factor keeps the tests fast
    const TEST_COST: u32 = 4;

    fn credentials() -> (CredentialStore, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (CredentialStore::new(store.clone(), TEST_COST), store)
    }

    #[tokio::test]
    async fn test_register_persists_hash_and_salt() {
        let (credentials, store) = credentials();

        let user = credentials.register("Admin", "SuperSecret").await.unwrap();

        assert!(!user.id.is_empty());
        assert_eq!(user.username, "Admin");
        assert_ne!(user.password_hash, "SuperSecret");
        assert!(user.password_hash.starts_with(&user.salt));
        assert!(user.salt.starts_with("$2b$04$"));
        assert_eq!(user.salt.len(), SALT_PREFIX_LEN);

        let stored = store.find_all(USERS, &match_all()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["passwordHash"], user.password_hash.as_str());
        assert_eq!(stored[0]["salt"], user.salt.as_str());
    }

    #[tokio::test]
    async fn test_salts_differ_between_registrations() {
        let (credentials, _) = credentials();
        let a = credentials.register("a", "same-password").await.unwrap();
        let b = credentials.register("b", "same-password").await.unwrap();
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[tokio::test]
    async fn test_verify_checks_stored_hash() {
        let (credentials, _) = credentials();
        credentials.register("Admin", "SuperSecret").await.unwrap();

        assert!(credentials.verify("Admin", "SuperSecret").await.unwrap());
        assert!(!credentials.verify("Admin", "supersecret").await.unwrap());
        assert!(!credentials.verify("admin", "SuperSecret").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_unknown_user_is_false() {
        let (credentials, _) = credentials();
        assert!(!credentials.verify("user", "password").await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_rejects_mismatched_salt() {
        let (credentials, store) = credentials();
        let user = credentials.register("Admin", "SuperSecret").await.unwrap();

        let tampered = User { salt: "$2b$04$AAAAAAAAAAAAAAAAAAAAAA".into(), ..user };
        store.drop_collection(USERS).await.unwrap();
        store.insert(USERS, encode(&tampered).unwrap()).await.unwrap();

        assert!(!credentials.verify("Admin", "SuperSecret").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_usernames_are_not_rejected() {
        let (credentials, store) = credentials();

        let first = credentials.register("Admin", "SuperSecret").await.unwrap();
        let second = credentials.register("Admin", "AnythingElse").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.find_all(USERS, &match_all()).await.unwrap().len(), 2);
        // lookups resolve to the first registration
        assert!(credentials.verify("Admin", "SuperSecret").await.unwrap());
        assert!(!credentials.verify("Admin", "AnythingElse").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_requires_both_fields() {
        let (credentials, store) = credentials();

        let result = credentials.register("", "").await;
        match result {
            Err(AppError::Validation(errors)) => {
                assert!(errors.has_field("username"));
                assert!(errors.has_field("password"));
            }
            other => panic!("Expected validation error, got: {:?}", other),
        }
        assert!(store.find_all(USERS, &match_all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_cost_surfaces_as_hash_error() {
        let store = Arc::new(InMemoryStore::new());
        let credentials = CredentialStore::new(store, 1);

        let result = credentials.register("Admin", "SuperSecret").await;
        assert!(matches!(result, Err(AppError::Hash(_))));
    }

    #[tokio::test]
    async fn test_seed_replaces_existing_users() {
        let (credentials, store) = credentials();
        credentials.register("old", "password1").await.unwrap();
        credentials.register("older", "password2").await.unwrap();

        credentials.seed("Admin", "SuperSecret").await.unwrap();

        let users = store.find_all(USERS, &match_all()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["username"], "Admin");
        assert!(credentials.verify("Admin", "SuperSecret").await.unwrap());
        assert!(!credentials.verify("old", "password1").await.unwrap());
    }
}
