
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::config::GroqConfig;
use crate::generation::{AnswerGenerator, SYSTEM_PROMPT, build_prompt};
use crate::{PdfChatError, Result};

/// Groq's OpenAI-compatible API root.
const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/";

/// Answer generator backed by Groq's hosted chat-completion API.
///
/// Requests are sent with `temperature: 0.0` for the most deterministic
/// output the service offers. Failed calls are not retried.
#[derive(Debug, Clone)]
pub struct GroqGenerator {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GroqGenerator {
    /// Create a generator from config. The API key must be present.
    #[inline]
    pub fn new(config: &GroqConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            PdfChatError::Config(format!(
                "{} environment variable not set",
                crate::config::GROQ_API_KEY_ENV
            ))
        })?;

        let base_url = Url::parse(GROQ_API_URL)
            .map_err(|e| PdfChatError::Config(format!("Invalid Groq API URL: {e}")))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model: config.model.clone(),
        })
    }

    /// Override the API root, for tests against a local mock server.
    #[inline]
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl AnswerGenerator for GroqGenerator {
    async fn generate(&self, question: &str, contexts: &[String]) -> Result<String> {
        let prompt = build_prompt(question, contexts);
        debug!(
            model = %self.model,
            contexts = contexts.len(),
            prompt_len = prompt.len(),
            "Requesting answer generation"
        );

        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| PdfChatError::Config(format!("Failed to build chat URL: {e}")))?;

        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Generation request failed: {e}");
                PdfChatError::Generation(format!("Request to language model failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!("Language model returned {status}: {detail}");
            return Err(PdfChatError::Generation(format!(
                "Language model returned {status}: {detail}"
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            PdfChatError::Generation(format!("Failed to parse generation response: {e}"))
        })?;

        let answer = chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                PdfChatError::Generation("Language model returned no choices".to_string())
            })?;

        debug!("Generated answer ({} chars)", answer.len());
        Ok(answer)
    }
}
