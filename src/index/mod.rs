// Vector index module
// Persists embedded chunks and serves nearest-neighbor lookups

pub mod lance;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// An entry stored in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique identifier for this entry.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Metadata about the chunk this entry represents.
    pub metadata: EntryMetadata,
}

/// Metadata stored alongside each vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Filename of the source document.
    pub document: String,
    /// Index of the chunk within its document.
    pub chunk_index: u32,
    /// The chunk's full text content.
    pub content: String,
    /// Timestamp when this entry was created.
    pub created_at: String,
}

/// A search hit with its distance to the query vector.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub metadata: EntryMetadata,
    /// Distance under the index's metric; smaller is closer.
    pub distance: f32,
}

/// Append-only vector store with nearest-neighbor search.
///
/// Entries are never updated or deleted; re-ingesting a document appends
/// duplicates. One index holds one shared collection spanning every
/// ingested document.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Append a batch of entries. All vectors in the index must share one
    /// dimension, fixed by the first written batch.
    async fn write(&self, entries: Vec<IndexEntry>) -> Result<()>;

    /// Return up to `k` entries nearest to `vector`, closest first.
    /// An index holding fewer than `k` entries returns what it has; an
    /// empty index returns an empty list. Never an error on short input.
    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>>;

    /// Total number of entries stored.
    async fn count(&self) -> Result<u64>;
}
