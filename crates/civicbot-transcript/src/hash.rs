//! BLAKE3 content hashing for tamper evidence.

use serde::Serialize;

use crate::{Step, Transcript, TranscriptId};

/// Hashable view of a transcript (excludes content_hash).
#[derive(Serialize)]
struct HashableTranscript<'a> {
    id: &'a TranscriptId,
    question: &'a str,
    user: &'a Option<String>,
    model: &'a str,
    steps: &'a [Step],
    started_at: &'a chrono::DateTime<chrono::Utc>,
    completed_at: &'a Option<chrono::DateTime<chrono::Utc>>,
}

/// Serialize all fields except `content_hash` to JSON and hash the bytes.
pub fn compute_transcript_hash(transcript: &Transcript) -> String {
    let hashable = HashableTranscript {
        id: &transcript.id,
        question: &transcript.question,
        user: &transcript.user,
        model: &transcript.model,
        steps: &transcript.steps,
        started_at: &transcript.started_at,
        completed_at: &transcript.completed_at,
    };

    let mut hasher = blake3::Hasher::new();
    if let Err(e) = serde_json::to_writer(&mut hasher, &hashable) {
        tracing::warn!(transcript_id = %transcript.id, error = %e, "Transcript hash input incomplete");
    }
    hasher.finalize().to_hex().to_string()
}
