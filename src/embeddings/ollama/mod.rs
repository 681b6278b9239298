#[cfg(test)]
mod tests;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::config::OllamaConfig;
use crate::embeddings::Embedder;
use crate::{PdfChatError, Result};

/// Embedding client for a local Ollama server.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: Url,
    model: String,
    batch_size: usize,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaEmbedder {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .map_err(|e| PdfChatError::Config(format!("Invalid Ollama URL: {e}")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            model: config.model.clone(),
            batch_size: config.batch_size as usize,
            dimension: config.embedding_dimension as usize,
        })
    }

    /// Send one `/api/embed` request for a slice of at most `batch_size`
    /// texts.
    async fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = self
            .base_url
            .join("/api/embed")
            .map_err(|e| PdfChatError::Config(format!("Failed to build embedding URL: {e}")))?;

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Embedding request failed: {e}");
                PdfChatError::Embedding(format!("Request to embedding server failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);

            error!("Embedding server returned {status}: {detail}");
            return Err(PdfChatError::Embedding(format!(
                "Embedding server returned {status}: {detail}"
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            PdfChatError::Embedding(format!("Failed to parse embedding response: {e}"))
        })?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(PdfChatError::Embedding(format!(
                "Mismatch between request and response counts: {} vs {}",
                texts.len(),
                embed_response.embeddings.len()
            )));
        }

        Ok(embed_response.embeddings)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Generating embedding for text (length: {})", text.len());

        let texts = [text.to_string()];
        let mut embeddings = self.embed_single_batch(&texts).await?;

        embeddings.pop().ok_or_else(|| {
            PdfChatError::Embedding("Embedding server returned an empty response".to_string())
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        // Process in batches to avoid overwhelming the server.
        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size.max(1)) {
            let embeddings = self.embed_single_batch(batch).await?;
            results.extend(embeddings);
        }

        debug!("Generated {} embeddings total", results.len());
        Ok(results)
    }

    fn dimensions(&self) -> usize {
        self.dimension
    }
}
