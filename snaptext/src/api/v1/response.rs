//! # V1 API Response Envelope & Error Contract
//!
//! Canonical wire format for all v1 responses. Every endpoint returns an
//! [`ApiResponse<T>`] envelope:
//!
//! ```json
//! {
//!   "data": { ... },                                     // success
//!   "error": { "code": "not_found", "message": "..." }   // failure
//! }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::SnaptextError;

/// Machine-readable error code included in every error response.
/// Serialized as a snake_case string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed request: bad parameters, unsupported file type, or an
    /// image that failed to decode. HTTP 400.
    InvalidRequest,
    /// The requested resource (session or cached result) does not exist.
    /// HTTP 404.
    NotFound,
    /// An unexpected server-side error. Internal details are never leaked
    /// to the client. HTTP 500.
    InternalError,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured error payload within the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Human-readable description safe to display to end users.
    pub message: String,
}

/// Canonical v1 response envelope. On success `data` is present and
/// `error` is absent; on error the reverse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,

    /// HTTP status to use in the response. Not serialized on the wire.
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success response with data (HTTP 200).
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    /// Resource created response (HTTP 201).
    pub fn created(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            status: StatusCode::CREATED,
        }
    }

    /// Error response. HTTP status derives from the [`ErrorCode`].
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        let status = code.status();
        Self {
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(_) => {
                let body = serde_json::json!({
                    "error": {
                        "code": "internal_error",
                        "message": "An internal error occurred"
                    }
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<SnaptextError> for ApiResponse<T> {
    /// Convert a [`SnaptextError`] into a v1 envelope. Internal error
    /// details are never leaked to the client.
    fn from(err: SnaptextError) -> Self {
        match err {
            SnaptextError::NotFound(ref msg) => ApiResponse::error(ErrorCode::NotFound, msg.clone()),
            SnaptextError::Validation(ref msg) | SnaptextError::Decode(ref msg) => {
                ApiResponse::error(ErrorCode::InvalidRequest, msg.clone())
            }
            ref internal @ (SnaptextError::Config(_)
            | SnaptextError::Json(_)
            | SnaptextError::Io(_)
            | SnaptextError::Internal(_)) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, "An internal error occurred")
            }
        }
    }
}
