//! Error types for the civicbot-llm crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Missing API key: set openai.api_key or OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Chat completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat completion API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Chat completion returned no choices")]
    EmptyReply,

    #[error("Executing template: {0}")]
    Template(#[from] askama::Error),
}

pub type Result<T> = std::result::Result<T, LlmError>;
