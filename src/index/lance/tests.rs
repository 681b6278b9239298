use super::*;
use tempfile::TempDir;

async fn open_test_index() -> (LanceIndex, TempDir) {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let index = LanceIndex::open(&temp_dir.path().join("vectors"))
        .await
        .expect("can open index");
    (index, temp_dir)
}

fn entry(id: &str, document: &str, seed: f32) -> IndexEntry {
    IndexEntry {
        id: id.to_string(),
        vector: vec![seed, seed + 0.1, seed + 0.2, seed + 0.3, seed + 0.4],
        metadata: EntryMetadata {
            document: document.to_string(),
            chunk_index: 0,
            content: format!("content of entry {id}"),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        },
    }
}

#[tokio::test]
async fn fresh_index_is_empty() {
    let (index, _temp_dir) = open_test_index().await;

    assert_eq!(index.count().await.expect("can count"), 0);

    let results = index.search(&[0.1, 0.2, 0.3, 0.4, 0.5], 3).await;
    assert!(results.expect("search on empty index succeeds").is_empty());
}

#[tokio::test]
async fn write_then_count() {
    let (index, _temp_dir) = open_test_index().await;

    index
        .write(vec![entry("1", "doc.pdf", 0.1), entry("2", "doc.pdf", 0.5)])
        .await
        .expect("can write entries");

    assert_eq!(index.count().await.expect("can count"), 2);
}

#[tokio::test]
async fn write_appends_without_dedup() {
    let (index, _temp_dir) = open_test_index().await;
    let batch = vec![entry("1", "doc.pdf", 0.1), entry("2", "doc.pdf", 0.5)];

    index.write(batch.clone()).await.expect("first write succeeds");
    index.write(batch).await.expect("identical second write succeeds");

    assert_eq!(index.count().await.expect("can count"), 4);
}

#[tokio::test]
async fn search_returns_nearest_first() {
    let (index, _temp_dir) = open_test_index().await;

    index
        .write(vec![
            entry("near", "doc.pdf", 0.1),
            entry("far", "doc.pdf", 5.0),
        ])
        .await
        .expect("can write entries");

    let results = index
        .search(&[0.1, 0.2, 0.3, 0.4, 0.5], 2)
        .await
        .expect("can search");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].metadata.content, "content of entry near");
    assert!(results[0].distance <= results[1].distance);
}

#[tokio::test]
async fn search_with_fewer_entries_than_k() {
    let (index, _temp_dir) = open_test_index().await;

    index
        .write(vec![entry("only", "doc.pdf", 0.2)])
        .await
        .expect("can write entry");

    let results = index
        .search(&[0.1, 0.2, 0.3, 0.4, 0.5], 3)
        .await
        .expect("search succeeds with short index");

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn dimension_mismatch_is_rejected() {
    let (index, _temp_dir) = open_test_index().await;

    index
        .write(vec![entry("1", "doc.pdf", 0.1)])
        .await
        .expect("can write first batch");

    let mismatched = IndexEntry {
        id: "2".to_string(),
        vector: vec![0.1, 0.2, 0.3],
        metadata: EntryMetadata {
            document: "doc.pdf".to_string(),
            chunk_index: 1,
            content: "short vector".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        },
    };

    let result = index.write(vec![mismatched]).await;
    assert!(matches!(result, Err(PdfChatError::Storage(_))));
}

#[tokio::test]
async fn entries_persist_across_reopen() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let db_path = temp_dir.path().join("vectors");

    {
        let index = LanceIndex::open(&db_path).await.expect("can open index");
        index
            .write(vec![entry("1", "doc.pdf", 0.1)])
            .await
            .expect("can write entry");
    }

    let reopened = LanceIndex::open(&db_path).await.expect("can reopen index");
    assert_eq!(reopened.count().await.expect("can count"), 1);

    let results = reopened
        .search(&[0.1, 0.2, 0.3, 0.4, 0.5], 1)
        .await
        .expect("can search reopened index");
    assert_eq!(results[0].metadata.document, "doc.pdf");
}

#[tokio::test]
async fn empty_write_is_a_no_op() {
    let (index, _temp_dir) = open_test_index().await;

    index.write(Vec::new()).await.expect("empty write succeeds");
    assert_eq!(index.count().await.expect("can count"), 0);
}
