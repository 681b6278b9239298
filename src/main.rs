use std::sync::Arc;

use clap::{Parser, Subcommand};

use pdf_chat::Result;
use pdf_chat::config::Config;
use pdf_chat::embeddings::{Embedder, ollama::OllamaEmbedder};
use pdf_chat::generation::{AnswerGenerator, groq::GroqGenerator};
use pdf_chat::index::{VectorIndex, lance::LanceIndex};
use pdf_chat::pipeline::{IngestionPipeline, QueryPipeline};
use pdf_chat::server::{self, AppState};
use pdf_chat::storage::UploadStore;

#[derive(Parser)]
#[command(name = "pdf-chat")]
#[command(about = "Chat with uploaded PDF documents over HTTP")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the listen host
        #[arg(long)]
        host: Option<String>,
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Show index and upload storage status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            let mut config = load_config()?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(&config.ollama)?);
            let generator: Arc<dyn AnswerGenerator> = Arc::new(GroqGenerator::new(&config.groq)?);
            let index: Arc<dyn VectorIndex> =
                Arc::new(LanceIndex::open(&config.vector_database_path()).await?);
            let store = UploadStore::new(config.uploads_path());

            let ingestion = Arc::new(IngestionPipeline::new(
                store,
                Arc::clone(&embedder),
                Arc::clone(&index),
            ));
            let query = Arc::new(QueryPipeline::new(embedder, index, generator));

            server::serve(&config.server_address(), AppState::new(ingestion, query)).await?;
        }
        Commands::Status => {
            let config = load_config()?;

            let index = LanceIndex::open(&config.vector_database_path()).await?;
            let entries = index.count().await?;

            let store = UploadStore::new(config.uploads_path());
            let mut uploads = store.list().await?;
            uploads.sort();

            println!("Data directory: {}", config.base_dir.display());
            println!("Index entries:  {entries}");
            println!("Uploads:        {}", uploads.len());
            for name in uploads {
                println!("  {name}");
            }
        }
    }

    Ok(())
}

fn load_config() -> Result<Config> {
    let base_dir = Config::default_base_dir()
        .map_err(|e| pdf_chat::PdfChatError::Config(e.to_string()))?;
    Config::load(base_dir).map_err(pdf_chat::PdfChatError::Other)
}
