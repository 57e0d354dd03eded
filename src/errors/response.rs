use axum::{
    response::{IntoResponse, Response, Redirect, Json},
    http::StatusCode,
};
use serde_json::json;
use crate::errors::AppError;
use crate::views::status_page;

// Converts AppError into the HTTP response the caller sees.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!("Request failed: {}", self);
            return status_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                "500.html",
                "Internal server error",
            );
        }

        match self {
            // Authentication errors redirect to login
            AppError::Auth(msg) => {
                Redirect::to(&format!("/login?error={}", urlencoding::encode(&msg)))
                    .into_response()
            }

            AppError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid credentials" })),
            ).into_response(),

            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": errors.to_string(),
                    "fields": errors.fields,
                })),
            ).into_response(),

            AppError::NotFound(what) => {
                tracing::debug!("Not found: {}", what);
                status_page(StatusCode::NOT_FOUND, "404.html", "Not found")
            }

            AppError::Upload(msg) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("Upload error: {}", msg) })),
            ).into_response(),

            // is_internal() covered the rest
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                other.to_string(),
            ).into_response(),
        }
    }
}
