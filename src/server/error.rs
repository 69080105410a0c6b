//! HTTP error mapping.

use crate::core::errors::DetectError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to HTTP clients.
///
/// Client mistakes (missing or undecodable uploads) carry their cause;
/// everything server-side collapses to a generic 500 so model and runtime
/// details never leak into responses. The full error chain is logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The multipart body carried no usable image field.
    #[error("no image provided")]
    MissingUpload,

    /// The multipart body itself was malformed.
    #[error("invalid multipart request: {0}")]
    InvalidRequest(String),

    /// The uploaded bytes were not a decodable image.
    #[error("could not decode uploaded image")]
    ImageDecode(#[source] DetectError),

    /// Any pipeline failure.
    #[error("internal error")]
    Internal(#[source] DetectError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingUpload | Self::InvalidRequest(_) | Self::ImageDecode(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::MissingUpload => "No image provided".to_string(),
            Self::InvalidRequest(detail) => format!("Invalid request: {detail}"),
            Self::ImageDecode(_) => "Could not decode uploaded image".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl From<DetectError> for ApiError {
    fn from(error: DetectError) -> Self {
        match error {
            DetectError::Decode(_) => Self::ImageDecode(error),
            other => Self::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_map_to_bad_request() {
        let decode = image::load_from_memory(b"junk").unwrap_err();
        let api: ApiError = DetectError::from(decode).into();
        assert_eq!(api.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn pipeline_errors_map_to_generic_internal() {
        let api: ApiError = DetectError::invalid_input("shape mismatch detail").into();
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.client_message(), "Internal server error");
    }
}
