use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{AuthSnapshot, Role, User};
use crate::services::auth::{self, LoginRequest, RegisterRequest, Session};
use crate::state::AppState;

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
}

/// Resolves a session token to its signed-in user.
pub(crate) fn user_for_token(state: &AppState, token: &str) -> Result<User, AppError> {
    let snapshot = {
        let db = state.db()?;
        auth::current(&db, token)?
    };
    match snapshot.user {
        Some(user) if snapshot.is_authenticated => Ok(user),
        _ => Err(AppError::Unauthorized),
    }
}

pub(crate) fn require_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    user_for_token(state, token)
}

pub(crate) fn require_admin_token(state: &AppState, token: &str) -> Result<User, AppError> {
    let user = user_for_token(state, token)?;
    if user.role != Role::Admin {
        return Err(AppError::Forbidden);
    }
    Ok(user)
}

pub(crate) fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let token = bearer_token(headers).ok_or(AppError::Unauthorized)?;
    require_admin_token(state, token)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    token: String,
    #[serde(flatten)]
    snapshot: AuthSnapshot,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            snapshot: session.snapshot,
        }
    }
}

// POST /api/auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = {
        let db = state.db()?;
        auth::register(&db, &body, &state.config.admin_email)?
    };
    Ok(Json(session.into()))
}

// POST /api/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = {
        let db = state.db()?;
        auth::login(&db, &body, &state.config.admin_email, &state.config.admin_password)?
    };
    Ok(Json(session.into()))
}

// POST /api/auth/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    let removed = {
        let db = state.db()?;
        auth::logout(&db, token)?
    };
    Ok(Json(serde_json::json!({"ok": true, "loggedOut": removed})))
}

// GET /api/auth/me
pub async fn me(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<AuthSnapshot>, AppError> {
    let snapshot = match bearer_token(&headers) {
        Some(token) => {
            let db = state.db()?;
            auth::current(&db, token)?
        }
        None => AuthSnapshot::signed_out(),
    };
    Ok(Json(snapshot))
}
