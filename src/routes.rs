use axum::{
    routing::{get, post},
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
};
use tower_http::{
    services::ServeDir,
    limit::RequestBodyLimitLayer,
};
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tower_sessions::cookie::SameSite;
use crate::{handlers, middleware, state::AppState};

pub fn router(state: AppState) -> Router {
    // Session store setup
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.auth.secure_cookie)
        .with_same_site(SameSite::Lax)
        .with_name("session");

    let public = Router::new()
        .route("/login", get(handlers::serve_login_page).post(handlers::handle_login))
        .route("/register", get(handlers::serve_register_page).post(handlers::handle_register))
        .route("/logout", get(handlers::handle_logout));

    // Everything here needs a logged-in identity
    let protected = Router::new()
        .route("/", get(handlers::serve_index))
        .route("/add-task", post(handlers::add_task))
        .route("/task/:id", get(handlers::view_task))
        .route("/download/:filename", get(handlers::download_file))
        .route_layer(from_fn(middleware::require_auth));

    let max_body = state.config.upload.max_file_size;

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(handlers::not_found)
        .layer(session_layer)
        // Upload size limit from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .with_state(state)
}
