// Answer generation module
// Produces grounded natural-language answers via an external hosted LLM

pub mod groq;


use async_trait::async_trait;

use crate::Result;

/// A service that answers a question grounded on retrieved context spans.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate an answer to `question` using `contexts` as the only
    /// source material. Called with zero contexts when the index has
    /// nothing to offer; the model decides how to respond.
    async fn generate(&self, question: &str, contexts: &[String]) -> Result<String>;
}

/// Instructions sent as the system message on every generation call.
const SYSTEM_PROMPT: &str = "You are an assistant that answers questions about uploaded \
documents. Base your answer only on the numbered context passages provided. If the \
passages do not contain the information needed, say that the documents do not cover it. \
Be concise.";

/// Build the user prompt from the question and retrieved context spans.
///
/// Contexts appear in retrieval-rank order, numbered so the model can
/// refer back to them.
fn build_prompt(question: &str, contexts: &[String]) -> String {
    use std::fmt::Write;

    let mut prompt = String::new();

    if contexts.is_empty() {
        prompt.push_str("No document context is available for this question.\n\n");
    } else {
        prompt.push_str("Context passages:\n\n");
        for (idx, context) in contexts.iter().enumerate() {
            // Writing to a String cannot fail.
            let _ = write!(prompt, "[{}] {}\n\n", idx + 1, context);
        }
    }

    prompt.push_str("Question: ");
    prompt.push_str(question);
    prompt
}
