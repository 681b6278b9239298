use super::*;
use tempfile::TempDir;

#[test]
fn defaults_are_valid() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.ollama.embedding_dimension, 768);
    assert_eq!(config.server.port, 8000);
}

#[test]
fn load_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let config = Config::load(temp_dir.path()).expect("can load defaults");

    assert_eq!(config.ollama, OllamaConfig::default());
    assert_eq!(config.base_dir, temp_dir.path());
}

#[test]
fn load_partial_file_keeps_other_defaults() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[server]\nport = 9100\n\n[ollama]\nmodel = \"mxbai-embed-large\"\n",
    )
    .expect("can write config file");

    let config = Config::load(temp_dir.path()).expect("can load config");

    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.ollama.model, "mxbai-embed-large");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.groq.model, "llama-3.1-8b-instant");
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    std::fs::write(
        temp_dir.path().join("config.toml"),
        "[ollama]\nprotocol = \"ftp\"\n",
    )
    .expect("can write config file");

    assert!(Config::load(temp_dir.path()).is_err());
}

#[test]
fn save_and_reload_round_trip() {
    let temp_dir = TempDir::new().expect("can create temp dir");
    let mut config = Config::default();
    config.base_dir = temp_dir.path().to_path_buf();
    config.server.port = 9000;
    config.ollama.batch_size = 32;

    config.save().expect("can save config");

    let reloaded = Config::load(temp_dir.path()).expect("can reload config");
    assert_eq!(reloaded.server.port, 9000);
    assert_eq!(reloaded.ollama.batch_size, 32);
}

#[test]
fn api_key_is_never_serialized() {
    let mut config = Config::default();
    config.groq.api_key = Some("secret".to_string());

    let serialized = toml::to_string(&config).expect("can serialize config");
    assert!(!serialized.contains("secret"));
    assert!(!serialized.contains("api_key"));
}

#[test]
fn ollama_validation_bounds() {
    let mut config = OllamaConfig::default();
    assert!(config.validate().is_ok());

    config.batch_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidBatchSize(0))
    ));

    config.batch_size = 16;
    config.embedding_dimension = 32;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidEmbeddingDimension(32))
    ));

    config.embedding_dimension = 768;
    config.model = "  ".to_string();
    assert!(matches!(config.validate(), Err(ConfigError::InvalidModel(_))));
}

#[test]
fn ollama_url_formats_correctly() {
    let config = OllamaConfig::default();
    let url = config.ollama_url().expect("can build URL");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn path_helpers_derive_from_base_dir() {
    let mut config = Config::default();
    config.base_dir = PathBuf::from("/tmp/pdf-chat-test");

    assert_eq!(
        config.uploads_path(),
        PathBuf::from("/tmp/pdf-chat-test/uploads")
    );
    assert_eq!(
        config.vector_database_path(),
        PathBuf::from("/tmp/pdf-chat-test/vectors")
    );
}
