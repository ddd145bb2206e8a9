use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// ApiError
///
/// The application's error taxonomy. Every handler failure is expressed as one
/// of these variants, which map 1:1 onto HTTP status codes and onto the shared
/// JSON error body consumed by the frontend.
///
/// Two rules shape the mapping:
/// - `InvalidCredentials` carries a single fixed message. Unknown username and
///   wrong password must be indistinguishable at the HTTP boundary.
/// - Where existence itself is sensitive (another author's draft), failures are
///   reported as `NotFound`, never `Forbidden`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing request fields (400).
    #[error("{0}")]
    InvalidInput(String),

    /// Login failure (401). The message is fixed regardless of cause.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Missing, malformed, or expired session token (401).
    #[error("Authentication required")]
    Unauthorized,

    /// Authenticated but not permitted (403).
    #[error("{0}")]
    Forbidden(String),

    /// Absent, or intentionally hidden from this caller (404).
    #[error("{0}")]
    NotFound(String),

    /// Unexpected internal failure (500). The client sees a generic message;
    /// the underlying cause is logged server-side only.
    #[error("Internal server error")]
    ServerError,
}

/// ErrorBody
///
/// The wire shape shared by every error response: `{success:false, error, message}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorBody {
    pub success: bool,
    /// The error kind, e.g. "InvalidCredentials".
    pub error: String,
    pub message: String,
}

impl ApiError {
    /// The stable kind string serialized into the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "InvalidInput",
            ApiError::InvalidCredentials => "InvalidCredentials",
            ApiError::Unauthorized => "Unauthorized",
            ApiError::Forbidden(_) => "Forbidden",
            ApiError::NotFound(_) => "NotFound",
            ApiError::ServerError => "ServerError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Database failures are never surfaced verbatim. `RowNotFound` keeps its
/// not-found semantics; everything else is logged and collapsed to ServerError.
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            other => {
                tracing::error!("database error: {:?}", other);
                ApiError::ServerError
            }
        }
    }
}
