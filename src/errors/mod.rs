// Application error type and result alias, built on thiserror.
use thiserror::Error;

pub mod response;
pub mod store;
pub mod validation;

pub use store::{StoreError, StoreResult};
pub use validation::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    // Missing or unreadable session: the caller is sent to the login page.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("File error: {0}")]
    File(#[from] std::io::Error),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Template error: {0}")]
    Template(String),
}

impl AppError {
    /// Errors that surface to the caller as a generic 500.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AppError::Store(_)
                | AppError::Hash(_)
                | AppError::File(_)
                | AppError::Session(_)
                | AppError::Join(_)
                | AppError::Template(_)
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;
