// Embedding generation module
// Maps text spans to fixed-length vectors via an external model server

pub mod ollama;

use async_trait::async_trait;

use crate::Result;

/// A provider that generates vector embeddings from text.
///
/// The same provider must be used for ingestion and querying: similarity
/// scores are meaningless across mismatched embedding models.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs, in order.
    ///
    /// The default implementation embeds sequentially; backends with a
    /// native batch API should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Dimensionality of the vectors this provider produces.
    fn dimensions(&self) -> usize;
}
