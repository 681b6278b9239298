// Configuration management module
// Handles TOML configuration and environment-provided credentials

pub mod settings;

pub use settings::{
    Config, ConfigError, GROQ_API_KEY_ENV, GroqConfig, OllamaConfig, ServerConfig,
};
