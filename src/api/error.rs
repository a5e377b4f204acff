//! API error type with HTTP status mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use super::types::ErrorResponse;
use crate::allocation::RequestError;
use crate::auth::AuthError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 400
    #[error("{0}")]
    BadRequest(String),
    /// 401
    #[error("{0}")]
    Unauthorized(String),
    /// 409
    #[error("{0}")]
    Conflict(String),
    /// 500
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::EmptyUserId | AuthError::PasswordTooShort { .. } => {
                Self::BadRequest(e.to_string())
            }
            AuthError::UserExists => Self::Conflict(e.to_string()),
            AuthError::InvalidCredentials | AuthError::UnknownUser(_) => {
                Self::Unauthorized(e.to_string())
            }
            AuthError::Store(inner) => inner.into(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        tracing::error!(error = %e, "record store failure");
        Self::Internal(e.to_string())
    }
}

impl From<RequestError> for ApiError {
    fn from(e: RequestError) -> Self {
        Self::BadRequest(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status_code(), body).into_response()
    }
}
