use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::appointments::BookingError;
use crate::services::auth::AuthError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error(transparent)]
    Booking(#[from] BookingError),

    #[error(transparent)]
    Auth(AuthError),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Storage(e) => AppError::Internal(e),
            other => AppError::Auth(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Booking(BookingError::UnknownSlot(_)) => StatusCode::NOT_FOUND,
            AppError::Booking(BookingError::SlotFull(_)) => StatusCode::CONFLICT,
            AppError::Booking(BookingError::DuplicateId(_)) => StatusCode::CONFLICT,
            AppError::Booking(BookingError::DateMismatch { .. }) => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            AppError::Auth(AuthError::EmailTaken) => StatusCode::CONFLICT,
            AppError::Auth(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
        };

        if let AppError::Internal(e) = &self {
            tracing::error!(error = %e, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
