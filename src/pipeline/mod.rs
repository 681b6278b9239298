// Pipeline module
// Orchestrates ingestion (upload -> index) and querying (question -> answer)


use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::chunking::{ChunkingConfig, chunk_document};
use crate::embeddings::Embedder;
use crate::extract::extract_pdf_text;
use crate::generation::AnswerGenerator;
use crate::index::{EntryMetadata, IndexEntry, VectorIndex};
use crate::storage::UploadStore;
use crate::{PdfChatError, Result};

/// Number of nearest chunks retrieved per query.
pub const TOP_K: usize = 3;

/// Length of the source excerpts returned alongside an answer, in
/// characters. Presentation only; prompts always use the full chunk text.
pub const SOURCE_PREVIEW_CHARS: usize = 500;

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub filename: String,
    pub chunks: usize,
}

/// An answer with its supporting source excerpts, in retrieval-rank order.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
}

/// Turns an uploaded document into index entries:
/// save -> extract -> chunk -> embed -> batch write.
///
/// Every step is a hard dependency on the previous one succeeding, and a
/// failure aborts the pipeline without rolling back earlier steps.
pub struct IngestionPipeline {
    store: UploadStore,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    chunking: ChunkingConfig,
}

impl IngestionPipeline {
    #[inline]
    pub fn new(
        store: UploadStore,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            store,
            embedder,
            index,
            chunking: ChunkingConfig::default(),
        }
    }

    /// Ingest one document. Returns the number of chunks written.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn ingest(&self, filename: &str, bytes: &[u8]) -> Result<IngestReport> {
        self.store.save(filename, bytes).await?;

        let pages = extract_pdf_text(bytes)?;
        let chunks = chunk_document(&pages, &self.chunking);
        if chunks.is_empty() {
            return Err(PdfChatError::Extraction(
                "Document produced no text chunks".to_string(),
            ));
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.content.clone()).collect();
        let vectors = self.embedder.embed_batch(&texts).await?;

        let created_at = Utc::now().to_rfc3339();
        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry {
                id: Uuid::new_v4().to_string(),
                vector,
                metadata: EntryMetadata {
                    document: filename.to_string(),
                    chunk_index: chunk.chunk_index as u32,
                    content: chunk.content.clone(),
                    created_at: created_at.clone(),
                },
            })
            .collect();

        let count = entries.len();
        self.index.write(entries).await?;

        info!("Ingested '{filename}': {count} chunks");
        Ok(IngestReport {
            filename: filename.to_string(),
            chunks: count,
        })
    }
}

/// Answers a question from the index:
/// embed -> search -> generate, then assemble the response.
pub struct QueryPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    generator: Arc<dyn AnswerGenerator>,
}

impl QueryPipeline {
    #[inline]
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            embedder,
            index,
            generator,
        }
    }

    /// Answer a question grounded on the nearest indexed chunks.
    ///
    /// An empty question is rejected before the embedder or index is
    /// touched. An empty index is not an error: the generator is invoked
    /// with no context and the response carries no sources.
    #[instrument(skip(self))]
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(PdfChatError::Validation(
                "Question must not be empty".to_string(),
            ));
        }

        let vector = self.embedder.embed(question).await?;
        let hits = self.index.search(&vector, TOP_K).await?;
        info!("Retrieved {} context chunks", hits.len());

        let contexts: Vec<String> = hits
            .into_iter()
            .map(|hit| hit.metadata.content)
            .collect();
        let answer = self.generator.generate(question, &contexts).await?;

        let sources = contexts
            .iter()
            .map(|content| source_preview(content))
            .collect();

        Ok(Answer { answer, sources })
    }
}

/// First [`SOURCE_PREVIEW_CHARS`] characters of a source text, with an
/// ellipsis marker appended.
fn source_preview(content: &str) -> String {
    let mut preview: String = content.chars().take(SOURCE_PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
