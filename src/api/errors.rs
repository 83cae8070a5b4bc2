use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::agents::errors::AgentError;
use crate::domain::dataset::DatasetError;

/// API error type with HTTP status code, machine-readable kind, and message
///
/// The `kind` is what the dashboard switches on: `missing_credential`,
/// `upstream_failure`, or `input_format`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    /// Creates a new API error
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    /// Creates a 413 Payload Too Large error for oversized uploads
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, "input_format", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "kind": self.kind,
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<AgentError> for ApiError {
    fn from(error: AgentError) -> Self {
        match &error {
            AgentError::MissingCredential => Self::new(
                StatusCode::BAD_REQUEST,
                "missing_credential",
                error.to_string(),
            ),
            AgentError::Upstream(_) | AgentError::EmptyReport => Self::new(
                StatusCode::BAD_GATEWAY,
                "upstream_failure",
                error.to_string(),
            ),
        }
    }
}

impl From<DatasetError> for ApiError {
    fn from(error: DatasetError) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "input_format",
            error.to_string(),
        )
    }
}
