//! Errors from content-graph operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Connecting to content graph at {uri}: {reason}")]
    Connection { uri: String, reason: String },

    #[error("Content graph query failed: {0}")]
    Query(#[from] neo4rs::Error),

    /// Body text or JS addressed a vertex that was never written.
    #[error("No {label} vertex with id {id}")]
    NotFound { label: String, id: String },

    #[error("Module id {id:?} is not a UUID: {source}")]
    InvalidId {
        id: String,
        #[source]
        source: uuid::Error,
    },

    #[error("Encoding module camera: {0}")]
    Camera(#[from] serde_json::Error),
}
