use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Error surface shared by every endpoint. Database errors are kept for
/// logging but never leaked into response bodies.
#[derive(Debug)]
pub enum ApiError {
    Validation(String),
    MalformedPayload(String),
    MissingOrderReference,
    Unauthorized(String),
    NotFound(String),
    Db(sqlx::Error),
    Internal(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Db(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    Validation,
    MalformedPayload,
    MissingOrderReference,
    Unauthorized,
    NotFound,
    Database,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub code: ApiErrorCode,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, ApiErrorCode::Validation, message)
            }
            ApiError::MalformedPayload(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorCode::MalformedPayload,
                message,
            ),
            ApiError::MissingOrderReference => (
                StatusCode::BAD_REQUEST,
                ApiErrorCode::MissingOrderReference,
                "missing order_id".to_string(),
            ),
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, ApiErrorCode::Unauthorized, message)
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, ApiErrorCode::NotFound, message),
            ApiError::Db(err) => {
                tracing::error!(error = %err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Database,
                    "database error".to_string(),
                )
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Internal,
                    "processing error".to_string(),
                )
            }
        };

        (
            status,
            Json(ApiErrorResponse {
                success: false,
                code,
                message,
            }),
        )
            .into_response()
    }
}
