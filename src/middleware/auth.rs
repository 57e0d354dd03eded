use axum::{
    middleware::Next,
    response::{IntoResponse, Response},
    extract::Request,
    body::Body,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use crate::errors::AppError;

/// Session key holding the logged-in identity.
pub const SESSION_KEY: &str = "user_session";

/// Who is making the request. Inserted by `require_auth` for handlers to extract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

pub async fn require_auth(
    session: Session,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match session.get::<Identity>(SESSION_KEY).await {
        Ok(Some(identity)) => {
            tracing::trace!("Request by {}", identity.username);
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Ok(None) => AppError::Auth("Please log in".into()).into_response(),
        Err(e) => {
            tracing::warn!("Failed to read session: {}", e);
            AppError::Auth(format!("Session error: {}", e)).into_response()
        }
    }
}
