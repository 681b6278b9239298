use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::PdfChatError;

impl IntoResponse for PdfChatError {
    /// Map pipeline errors to HTTP responses.
    ///
    /// Client mistakes keep their message; upstream service failures are
    /// reported as bad gateways; internal failures are logged in full and
    /// returned as an opaque 500.
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PdfChatError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            PdfChatError::Extraction(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            PdfChatError::Embedding(msg) | PdfChatError::Generation(msg) => {
                (StatusCode::BAD_GATEWAY, msg)
            }
            PdfChatError::Storage(msg) | PdfChatError::Config(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            PdfChatError::Io(e) => {
                tracing::error!("IO error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            PdfChatError::Other(e) => {
                tracing::error!("Unexpected error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
