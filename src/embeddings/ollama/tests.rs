use super::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn embedder_for(server: &MockServer) -> OllamaEmbedder {
    let url = Url::parse(&server.uri()).expect("mock server URI is valid");
    let config = OllamaConfig {
        protocol: url.scheme().to_string(),
        host: url.host_str().expect("mock server has a host").to_string(),
        port: url.port().expect("mock server has a port"),
        batch_size: 2,
        embedding_dimension: 4,
        ..OllamaConfig::default()
    };
    OllamaEmbedder::new(&config).expect("can build embedder")
}

#[tokio::test]
async fn embed_returns_vector() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .and(body_partial_json(json!({
            "model": "nomic-embed-text:latest",
            "input": ["hello world"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1, 0.2, 0.3, 0.4]],
        })))
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let vector = embedder.embed("hello world").await.expect("embed succeeds");

    assert_eq!(vector, vec![0.1, 0.2, 0.3, 0.4]);
    assert_eq!(embedder.dimensions(), 4);
}

#[tokio::test]
async fn embed_batch_splits_into_server_batches() {
    let server = MockServer::start().await;

    // batch_size is 2, so four texts arrive as two requests.
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]],
        })))
        .expect(2)
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let texts: Vec<String> = (0..4).map(|i| format!("text {i}")).collect();
    let vectors = embedder.embed_batch(&texts).await.expect("batch succeeds");

    assert_eq!(vectors.len(), 4);
}

#[tokio::test]
async fn embed_batch_of_nothing_skips_the_server() {
    let server = MockServer::start().await;
    let embedder = embedder_for(&server);

    let vectors = embedder.embed_batch(&[]).await.expect("empty batch is fine");
    assert!(vectors.is_empty());

    // No mock was mounted: any request would have returned a 404 error.
}

#[tokio::test]
async fn count_mismatch_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.1, 0.2, 0.3, 0.4]],
        })))
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let texts = vec!["one".to_string(), "two".to_string()];
    let result = embedder.embed_batch(&texts).await;

    assert!(matches!(result, Err(PdfChatError::Embedding(_))));
}

#[tokio::test]
async fn server_error_surfaces_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"error": "model not loaded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let result = embedder.embed("hello").await;

    match result {
        Err(PdfChatError::Embedding(msg)) => assert!(msg.contains("model not loaded")),
        other => panic!("expected embedding error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_response_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let embedder = embedder_for(&server);
    let result = embedder.embed("hello").await;

    assert!(matches!(result, Err(PdfChatError::Embedding(_))));
}
