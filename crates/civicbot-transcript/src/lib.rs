//! civicbot-transcript: tamper-evident record of answered questions.
//!
//! A transcript captures one question's trip through the bot: the generated
//! SQL, the rendered table, the chosen chart, and the published path.
//! Each transcript is content-hashed with BLAKE3 so later edits are
//! detectable, and stored as JSON files organized by date.

pub mod hash;
pub mod session;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use session::TranscriptSession;
pub use store::{FileTranscriptStore, StoreError, TranscriptQuery, TranscriptStore};

/// Unique identifier for a transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TranscriptId(pub Uuid);

impl TranscriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TranscriptId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TranscriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of answering a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Step kind (e.g. "sql_analysis", "load_results", "select_chart", "publish").
    pub kind: String,
    /// Human-readable description.
    pub summary: String,
    /// Structured output of the step.
    pub details: serde_json::Value,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// The complete record of one answered (or failed) question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    pub id: TranscriptId,
    /// The question as the user asked it.
    pub question: String,
    /// Who asked, when known.
    pub user: Option<String>,
    /// Chat model that produced the replies.
    pub model: String,
    pub steps: Vec<Step>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// BLAKE3 content hash (hex), set on finalization.
    pub content_hash: Option<String>,
}

impl Transcript {
    /// BLAKE3 hash over every field except `content_hash`.
    pub fn compute_hash(&self) -> String {
        hash::compute_transcript_hash(self)
    }

    /// True when the stored hash matches the content.
    pub fn verify_integrity(&self) -> bool {
        match &self.content_hash {
            Some(stored) => stored == &self.compute_hash(),
            None => false,
        }
    }

    /// True when every recorded step succeeded.
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.success)
    }
}
