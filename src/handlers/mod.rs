mod auth;
mod task;

use axum::{http::StatusCode, response::Response};
use crate::views::status_page;

pub use auth::{serve_login_page, serve_register_page, handle_login, handle_register, handle_logout};
pub use task::{serve_index, add_task, view_task, download_file};

pub async fn not_found() -> Response {
    status_page(StatusCode::NOT_FOUND, "404.html", "Not found")
}
