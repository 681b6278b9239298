use axum::Json;
use axum::extract::{Multipart, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::pipeline::{Answer, IngestReport};
use crate::server::AppState;
use crate::{PdfChatError, Result};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub chunks: usize,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
}

/// Health probe. Always 200.
#[inline]
#[expect(clippy::unused_async, reason = "axum handlers must be async")]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "pdf-chat backend is running".to_string(),
    })
}

/// Ingest an uploaded PDF: the multipart body must carry a `file` field.
#[inline]
pub async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let (filename, bytes) = read_file_field(multipart).await?;
    info!("Received upload '{filename}' ({} bytes)", bytes.len());

    let IngestReport { filename, chunks } = state.ingestion.ingest(&filename, &bytes).await?;

    Ok(Json(UploadResponse {
        filename,
        chunks,
        status: "learned".to_string(),
    }))
}

/// Answer a question from previously ingested documents.
#[inline]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<Answer>> {
    let answer = state.query.answer(&request.question).await?;
    Ok(Json(answer))
}

/// Pull the `file` field out of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Vec<u8>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| PdfChatError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| {
                PdfChatError::Validation("File field is missing a filename".to_string())
            })?
            .to_string();

        let bytes = field
            .bytes()
            .await
            .map_err(|e| PdfChatError::Validation(format!("Failed to read upload: {e}")))?;

        return Ok((filename, bytes.to_vec()));
    }

    Err(PdfChatError::Validation(
        "Multipart body is missing a 'file' field".to_string(),
    ))
}
