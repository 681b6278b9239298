#[cfg(test)]
mod tests;

use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::index::{EntryMetadata, IndexEntry, ScoredEntry, VectorIndex};
use crate::{PdfChatError, Result};

const TABLE_NAME: &str = "chunks";

/// Vector index backed by LanceDB on local disk.
///
/// The table is created lazily on the first write, which fixes the vector
/// dimension for the index's lifetime. Reopening an existing database
/// picks the dimension up from the stored schema.
pub struct LanceIndex {
    connection: Connection,
    /// `None` until the table exists; guards lazy creation.
    dimension: Mutex<Option<usize>>,
}

impl LanceIndex {
    /// Open (or create) the index under the given directory.
    #[inline]
    pub async fn open(db_path: &Path) -> Result<Self> {
        debug!("Initializing LanceDB at path: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PdfChatError::Storage(format!("Failed to create vector database directory: {e}"))
            })?;
        }

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to connect to LanceDB: {e}")))?;

        let dimension = Self::detect_existing_dimension(&connection).await?;
        if let Some(dim) = dimension {
            info!("Opened vector index with {dim} dimensions");
        }

        Ok(Self {
            connection,
            dimension: Mutex::new(dimension),
        })
    }

    /// Read the vector dimension from an existing table's schema, if the
    /// table exists.
    async fn detect_existing_dimension(connection: &Connection) -> Result<Option<usize>> {
        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to list tables: {e}")))?;

        if !table_names.iter().any(|name| name == TABLE_NAME) {
            return Ok(None);
        }

        let table = connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to open existing table: {e}")))?;

        let schema = table
            .schema()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to read table schema: {e}")))?;

        for field in schema.fields() {
            if field.name() == "vector" {
                if let DataType::FixedSizeList(_, size) = field.data_type() {
                    return Ok(Some(*size as usize));
                }
            }
        }

        Err(PdfChatError::Storage(
            "Could not find vector column or determine dimension".to_string(),
        ))
    }

    fn create_schema(vector_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    vector_dim as i32,
                ),
                false,
            ),
            Field::new("document", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    fn create_record_batch(entries: &[IndexEntry], vector_dim: usize) -> Result<RecordBatch> {
        let len = entries.len();

        let mut ids = Vec::with_capacity(len);
        let mut documents = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * vector_dim);

        for entry in entries {
            ids.push(entry.id.as_str());
            documents.push(entry.metadata.document.as_str());
            chunk_indices.push(entry.metadata.chunk_index);
            contents.push(entry.metadata.content.as_str());
            created_ats.push(entry.metadata.created_at.as_str());
            flat_values.extend_from_slice(&entry.vector);
        }

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array =
            FixedSizeListArray::try_new(field, vector_dim as i32, Arc::new(values_array), None)
                .map_err(|e| {
                    PdfChatError::Storage(format!("Failed to create vector array: {e}"))
                })?;

        let arrays: Vec<Arc<dyn arrow::array::Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(StringArray::from(documents)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(contents)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(Self::create_schema(vector_dim), arrays)
            .map_err(|e| PdfChatError::Storage(format!("Failed to create record batch: {e}")))
    }

    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<ScoredEntry>> {
        let documents = string_column(batch, "document")?;
        let chunk_indices = batch
            .column_by_name("chunk_index")
            .and_then(|col| col.as_any().downcast_ref::<UInt32Array>())
            .ok_or_else(|| {
                PdfChatError::Storage("Missing or invalid chunk_index column".to_string())
            })?;
        let contents = string_column(batch, "content")?;
        let created_ats = string_column(batch, "created_at")?;

        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let mut results = Vec::with_capacity(batch.num_rows());
        for row in 0..batch.num_rows() {
            let metadata = EntryMetadata {
                document: documents.value(row).to_string(),
                chunk_index: chunk_indices.value(row),
                content: contents.value(row).to_string(),
                created_at: created_ats.value(row).to_string(),
            };

            let distance = distances.map_or(0.0, |d| {
                if d.is_null(row) { 0.0 } else { d.value(row) }
            });

            results.push(ScoredEntry { metadata, distance });
        }

        Ok(results)
    }
}

fn string_column<'a>(
    batch: &'a RecordBatch,
    name: &str,
) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| PdfChatError::Storage(format!("Missing or invalid {name} column")))
}

#[async_trait]
impl VectorIndex for LanceIndex {
    async fn write(&self, entries: Vec<IndexEntry>) -> Result<()> {
        if entries.is_empty() {
            debug!("No entries to write");
            return Ok(());
        }

        let vector_dim = entries[0].vector.len();
        if entries.iter().any(|entry| entry.vector.len() != vector_dim) {
            return Err(PdfChatError::Storage(
                "Entries in one batch must share a vector dimension".to_string(),
            ));
        }

        let mut dimension = self.dimension.lock().await;
        match *dimension {
            Some(existing) if existing != vector_dim => {
                return Err(PdfChatError::Storage(format!(
                    "Vector dimension mismatch: index holds {existing}-dimensional vectors, \
                     batch has {vector_dim}"
                )));
            }
            Some(_) => {}
            None => {
                info!("Creating vector table with {vector_dim} dimensions");
                self.connection
                    .create_empty_table(TABLE_NAME, Self::create_schema(vector_dim))
                    .execute()
                    .await
                    .map_err(|e| {
                        PdfChatError::Storage(format!("Failed to create table: {e}"))
                    })?;
                *dimension = Some(vector_dim);
            }
        }

        let record_batch = Self::create_record_batch(&entries, vector_dim)?;

        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to open table: {e}")))?;

        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to insert entries: {e}")))?;

        info!("Stored {} index entries", entries.len());
        Ok(())
    }

    async fn search(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>> {
        // No table yet means nothing has ever been ingested.
        if self.dimension.lock().await.is_none() {
            debug!("Search against empty index");
            return Ok(Vec::new());
        }

        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to open table: {e}")))?;

        let query = table
            .vector_search(vector)
            .map_err(|e| PdfChatError::Storage(format!("Failed to create vector search: {e}")))?
            .column("vector")
            .limit(k);

        let mut stream = query
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to execute search: {e}")))?;

        let mut results = Vec::new();
        while let Some(batch) = stream
            .try_next()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to read result stream: {e}")))?
        {
            results.extend(Self::parse_search_batch(&batch)?);
        }

        debug!("Search returned {} results", results.len());
        Ok(results)
    }

    async fn count(&self) -> Result<u64> {
        if self.dimension.lock().await.is_none() {
            return Ok(0);
        }

        let table = self
            .connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to open table: {e}")))?;

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to count rows: {e}")))?;

        Ok(count as u64)
    }
}
