use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::AuthError;
use crate::extract::ExtractionError;
use crate::services::{IngestError, LoginError, RegisterError};
use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

/// Boundary error: each variant is one HTTP status. The message is what the
/// caller sees; `Internal` carries detail for the log only.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Conflict(String),
    Unauthorized(String),
    NotFound(String),
    PayloadTooLarge(String),
    Unavailable(String),
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(inner: StoreError) -> Self {
        AppError::Internal(inner.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(inner: AuthError) -> Self {
        match inner {
            AuthError::TokenMissing => AppError::Unauthorized("Missing token".to_string()),
            AuthError::TokenMalformed => AppError::Unauthorized("Invalid token".to_string()),
            AuthError::TokenExpired => AppError::Unauthorized("Token expired".to_string()),
            AuthError::LifetimeOutOfRange => {
                AppError::Internal("token lifetime out of range".to_string())
            }
            AuthError::Signing(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<RegisterError> for AppError {
    fn from(inner: RegisterError) -> Self {
        match inner {
            RegisterError::MissingField(_) => {
                AppError::Validation("Email, username and password are required".to_string())
            }
            RegisterError::EmailTaken => AppError::Conflict("Email already registered".to_string()),
            RegisterError::UsernameTaken => {
                AppError::Conflict("Username already taken".to_string())
            }
            RegisterError::Hashing(e) => AppError::Internal(e.to_string()),
            RegisterError::Token(e) => AppError::from(e),
            RegisterError::Store(e) => AppError::from(e),
        }
    }
}

impl From<LoginError> for AppError {
    fn from(inner: LoginError) -> Self {
        match inner {
            LoginError::MissingField(_) => {
                AppError::Validation("Email and password are required".to_string())
            }
            LoginError::InvalidCredentials => {
                AppError::Unauthorized("Invalid email or password".to_string())
            }
            LoginError::Token(e) => AppError::from(e),
            LoginError::Store(e) => AppError::from(e),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(inner: ExtractionError) -> Self {
        match inner {
            ExtractionError::UnsupportedFormat(_) => AppError::Validation(
                "Unsupported file format. Accepted formats: PDF, DOCX, TXT".to_string(),
            ),
            ExtractionError::CorruptFile(_) => {
                AppError::Validation("The file could not be read".to_string())
            }
        }
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        match inner {
            IngestError::MissingFilename => AppError::Validation("Empty filename".to_string()),
            IngestError::Extraction(e) => AppError::from(e),
            IngestError::Store(e) => AppError::from(e),
            IngestError::Task(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}
