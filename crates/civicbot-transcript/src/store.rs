//! Transcript storage: the store trait and a file-system implementation.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{Transcript, TranscriptId};

/// Errors that can occur during transcript storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Transcript not found: {0}")]
    NotFound(TranscriptId),

    #[error("Integrity check failed for transcript {0}: stored hash does not match content")]
    IntegrityViolation(TranscriptId),

    #[error("Transcript has no content hash (not finalized)")]
    NotFinalized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Filters for listing transcripts.
#[derive(Debug, Default)]
pub struct TranscriptQuery {
    /// Case-insensitive substring of the question.
    pub contains: Option<String>,
    /// Only include transcripts started at or after this time.
    pub from: Option<DateTime<Utc>>,
    /// Only include transcripts started at or before this time.
    pub to: Option<DateTime<Utc>>,
    /// Return at most this many (newest first).
    pub limit: Option<usize>,
}

/// Trait for transcript persistence backends.
pub trait TranscriptStore {
    /// Store a finalized transcript.
    fn save(&self, transcript: &Transcript) -> Result<(), StoreError>;

    /// Retrieve a transcript by ID, verifying integrity.
    fn get(&self, id: TranscriptId) -> Result<Transcript, StoreError>;

    /// List transcripts matching the query, ordered by started_at descending.
    fn list(&self, query: &TranscriptQuery) -> Result<Vec<Transcript>, StoreError>;
}

/// File-system backed transcript store.
///
/// ```text
/// {root}/
///   2023/
///     03/
///       07/
///         {transcript_id}.json
/// ```
pub struct FileTranscriptStore {
    root: PathBuf,
}

impl FileTranscriptStore {
    /// Open (and create if missing) a store under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// `{root}/YYYY/MM/DD/{id}.json`, dated by when the question was asked.
    fn path_for(&self, transcript: &Transcript) -> PathBuf {
        self.root
            .join(transcript.started_at.format("%Y/%m/%d").to_string())
            .join(file_name(transcript.id))
    }
}

impl TranscriptStore for FileTranscriptStore {
    fn save(&self, transcript: &Transcript) -> Result<(), StoreError> {
        if transcript.content_hash.is_none() {
            return Err(StoreError::NotFinalized);
        }

        let path = self.path_for(transcript);
        if let Some(day_dir) = path.parent() {
            fs::create_dir_all(day_dir)?;
        }
        fs::write(&path, serde_json::to_vec_pretty(transcript)?)?;

        tracing::debug!(transcript_id = %transcript.id, path = %path.display(), "Transcript saved");
        Ok(())
    }

    fn get(&self, id: TranscriptId) -> Result<Transcript, StoreError> {
        let wanted = file_name(id);
        let path = json_files(&self.root)?
            .into_iter()
            .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(wanted.as_str()))
            .ok_or(StoreError::NotFound(id))?;

        let transcript: Transcript = serde_json::from_slice(&fs::read(&path)?)?;
        if !transcript.verify_integrity() {
            return Err(StoreError::IntegrityViolation(id));
        }
        Ok(transcript)
    }

    fn list(&self, query: &TranscriptQuery) -> Result<Vec<Transcript>, StoreError> {
        let mut found = Vec::new();
        for path in json_files(&self.root)? {
            match serde_json::from_slice::<Transcript>(&fs::read(&path)?) {
                Ok(t) if query.matches(&t) => found.push(t),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable transcript");
                }
            }
        }

        found.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }
}

impl TranscriptQuery {
    fn matches(&self, transcript: &Transcript) -> bool {
        let question_ok = self.contains.as_ref().map_or(true, |needle| {
            transcript
                .question
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let from_ok = self.from.map_or(true, |from| transcript.started_at >= from);
        let to_ok = self.to.map_or(true, |to| transcript.started_at <= to);
        question_ok && from_ok && to_ok
    }
}

fn file_name(id: TranscriptId) -> String {
    format!("{id}.json")
}

/// Every `.json` file below `dir`, depth first.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)?.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
                files.push(path);
            }
        }
    }
    Ok(files)
}
