use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `IDENTITY_UNRESOLVED`,
    /// `PERMISSION_DENIED`, `NOT_PARTICIPANT`, `NOT_FOUND`, `CONFLICT`,
    /// `UPLOAD_FAILED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Category must be between 0 and 3")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    /// The credential verified but the member directory knows no such member.
    IdentityUnresolved,
    /// Caller is not the challenge's author.
    PermissionDenied,
    /// Caller holds no participation record for the challenge.
    NotParticipant,
    NotFound(String),
    Conflict(String),
    /// The image store failed to accept or produce an upload.
    Upload(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::IdentityUnresolved => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "IDENTITY_UNRESOLVED",
                    message: "Member could not be resolved from the credential".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Only the challenge author may do this".into(),
                },
            ),
            AppError::NotParticipant => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "NOT_PARTICIPANT",
                    message: "Only participants of this challenge may do this".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Upload(detail) => {
                tracing::warn!("Image store failure: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        code: "UPLOAD_FAILED",
                        message: "Image store operation failed".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            // The caller sent more bytes than the store accepts.
            StorageError::SizeLimitExceeded { actual, limit } => AppError::Validation(format!(
                "Image exceeds size limit ({actual} > {limit} bytes)"
            )),
            other => AppError::Upload(other.to_string()),
        }
    }
}
