use thiserror::Error;

/// Errors shared across civicbot crates.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Decoding reply {reply:?}: {source}")]
    Decode {
        reply: String,
        #[source]
        source: serde_json::Error,
    },
}
