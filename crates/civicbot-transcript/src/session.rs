//! Incremental transcript recorder.
//!
//! ```no_run
//! # use civicbot_transcript::TranscriptSession;
//! let mut session = TranscriptSession::new("How much did we spend on libraries?", "gpt-3.5-turbo");
//! session.set_user("jane");
//! session.record_step(
//!     "sql_analysis",
//!     "Generated SQL",
//!     serde_json::json!({"sql": "SELECT SUM(amount) FROM operating_budget"}),
//!     true,
//! );
//! let transcript = session.finalize();
//! assert!(transcript.content_hash.is_some());
//! ```

use chrono::Utc;

use crate::{Step, Transcript, TranscriptId};

/// Records steps as the bot answers a question.
pub struct TranscriptSession {
    transcript: Transcript,
}

impl TranscriptSession {
    pub fn new(question: &str, model: &str) -> Self {
        Self {
            transcript: Transcript {
                id: TranscriptId::new(),
                question: question.to_string(),
                user: None,
                model: model.to_string(),
                steps: Vec::new(),
                started_at: Utc::now(),
                completed_at: None,
                content_hash: None,
            },
        }
    }

    pub fn set_user(&mut self, user: &str) {
        self.transcript.user = Some(user.to_string());
    }

    pub fn record_step(
        &mut self,
        kind: &str,
        summary: &str,
        details: serde_json::Value,
        success: bool,
    ) {
        self.transcript.steps.push(Step {
            kind: kind.to_string(),
            summary: summary.to_string(),
            details,
            success,
            timestamp: Utc::now(),
        });
    }

    /// Record a failed step with the error text.
    pub fn record_error(&mut self, kind: &str, error: &str) {
        self.record_step(
            kind,
            &format!("Failed: {error}"),
            serde_json::json!({ "error": error }),
            false,
        );
    }

    pub fn id(&self) -> TranscriptId {
        self.transcript.id
    }

    /// Set completed_at and compute the content hash.
    pub fn finalize(mut self) -> Transcript {
        self.transcript.completed_at = Some(Utc::now());
        let hash = self.transcript.compute_hash();
        self.transcript.content_hash = Some(hash);
        self.transcript
    }
}
