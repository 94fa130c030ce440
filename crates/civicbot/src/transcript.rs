//! Transcript helpers for answer runs.

use civicbot_core::{ChartSelectResponse, SqlResponse};
use civicbot_transcript::{FileTranscriptStore, Transcript, TranscriptSession, TranscriptStore};

/// Create a transcript session for one question.
pub fn start_session(question: &str, model: &str, user: Option<&str>) -> TranscriptSession {
    let mut session = TranscriptSession::new(question, model);
    if let Some(user) = user {
        session.set_user(user);
    }
    session
}

pub fn record_sql_analysis(session: &mut TranscriptSession, resp: &SqlResponse) {
    let summary = if resp.has_query() {
        "Generated SQL".to_string()
    } else {
        format!("No SQL generated: {}", resp.missing_data)
    };
    session.record_step(
        "sql_analysis",
        &summary,
        serde_json::json!({
            "schema": resp.schema,
            "applicability": resp.applicability,
            "sql": resp.sql,
            "missing_data": resp.missing_data,
        }),
        resp.has_query(),
    );
}

pub fn record_results(session: &mut TranscriptSession, table: &str) {
    // Header and border lines aside, one line per row.
    let rows = table.lines().count().saturating_sub(4);
    session.record_step(
        "load_results",
        &format!("Loaded {rows} rows"),
        serde_json::json!({ "table": table }),
        true,
    );
}

pub fn record_chart(session: &mut TranscriptSession, chart: &ChartSelectResponse) {
    session.record_step(
        "select_chart",
        &format!("Chose {} chart \"{}\"", chart.chart_type(), chart.title),
        serde_json::json!({
            "chart": chart.chart,
            "title": chart.title,
            "entries": chart.data.len(),
            "value_is_currency": chart.value_is_currency,
        }),
        true,
    );
}

pub fn record_publish(session: &mut TranscriptSession, module_id: &str, path: &str) {
    session.record_step(
        "publish",
        &format!("Published module at {path}"),
        serde_json::json!({ "module_id": module_id, "path": path }),
        true,
    );
}

/// Record a failed step.
pub fn record_failure(session: &mut TranscriptSession, kind: &str, error: &dyn std::fmt::Display) {
    session.record_error(kind, &error.to_string());
}

/// Finalize the session and store the transcript. Storage failures are logged, not returned.
pub fn finalize_and_store(session: TranscriptSession, transcript_dir: &str) -> Transcript {
    let transcript = session.finalize();

    match FileTranscriptStore::new(transcript_dir) {
        Ok(store) => match store.save(&transcript) {
            Ok(()) => {
                tracing::info!(transcript_id = %transcript.id, "Transcript recorded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to store transcript");
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to initialize transcript store");
        }
    }

    transcript
}
