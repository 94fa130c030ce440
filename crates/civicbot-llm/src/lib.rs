//! civicbot-llm: Chat-completion client and prompt templates.
//!
//! Each bot step renders one prompt and sends it as a single user message
//! to an OpenAI-compatible chat-completion endpoint. The [`ChatModel`] trait
//! is the seam the orchestrator depends on.

pub mod client;
pub mod error;
pub mod prompts;

pub use client::{ChatModel, OpenAiClient};
pub use error::LlmError;
pub use prompts::{ChartSelectPrompt, SqlGenPrompt};
