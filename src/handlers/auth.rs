use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Response, Redirect},
};
use tower_sessions::Session;
use crate::errors::{AppError, AppResult, ValidationErrors};
use crate::middleware::{Identity, SESSION_KEY};
use crate::models::{LoginForm, PageQuery, RegisterForm};
use crate::state::AppState;
use crate::views::Page;

pub async fn serve_login_page(Query(query): Query<PageQuery>) -> AppResult<Html<String>> {
    Page::new("login.html")
        .text("error", query.error.as_deref().unwrap_or(""))
        .render()
}

pub async fn serve_register_page(Query(query): Query<PageQuery>) -> AppResult<Html<String>> {
    Page::new("register.html")
        .text("error", query.error.as_deref().unwrap_or(""))
        .render()
}

#[axum::debug_handler]
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Form(login_form): Form<LoginForm>,
) -> AppResult<Response> {
    tracing::info!("Login attempt for user: {}", login_form.username);

    if !state.credentials.verify(&login_form.username, &login_form.password).await? {
        tracing::info!("Invalid credentials for user: {}", login_form.username);
        return Err(AppError::InvalidCredentials);
    }

    let identity = Identity { username: login_form.username };
    session
        .insert(SESSION_KEY, &identity)
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    tracing::info!("User logged in: {}", identity.username);
    Ok(Redirect::to("/").into_response())
}

pub async fn handle_register(
    State(state): State<AppState>,
    Form(register_form): Form<RegisterForm>,
) -> AppResult<Response> {
    if let Some(confirm) = &register_form.confirm_password {
        if confirm != &register_form.password {
            let mut errors = ValidationErrors::new("User");
            errors.push("confirm_password", "Passwords don't match");
            return Err(errors.into());
        }
    }

    let user = state
        .credentials
        .register(&register_form.username, &register_form.password)
        .await?;

    tracing::debug!("User registered: {}", user.id);
    Ok(Redirect::to("/login").into_response())
}

/// Drops the whole session record, so the old session id stops working.
#[axum::debug_handler]
pub async fn handle_logout(session: Session) -> AppResult<Response> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Session(e.to_string()))?;

    Ok(Redirect::to("/login").into_response())
}
