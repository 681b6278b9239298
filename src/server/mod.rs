// HTTP server module
// Exposes the ingestion and query pipelines over axum

pub mod errors;
pub mod routes;


use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::pipeline::{IngestionPipeline, QueryPipeline};
use crate::{PdfChatError, Result};

/// Maximum accepted upload size.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared handles to the pipelines, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub ingestion: Arc<IngestionPipeline>,
    pub query: Arc<QueryPipeline>,
}

impl AppState {
    #[inline]
    pub fn new(ingestion: Arc<IngestionPipeline>, query: Arc<QueryPipeline>) -> Self {
        Self { ingestion, query }
    }
}

/// Build the application router.
///
/// CORS is fully permissive: the API is meant to be callable from any
/// web client.
#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route("/upload", post(routes::upload))
        .route("/chat", post(routes::chat))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Bind and serve until the process is stopped.
#[inline]
pub async fn serve(address: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|e| PdfChatError::Config(format!("Failed to bind {address}: {e}")))?;

    info!("Server listening on http://{address}");

    axum::serve(listener, router(state))
        .await
        .map_err(PdfChatError::Io)?;

    Ok(())
}
