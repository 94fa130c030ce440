//! Error types for the civicbot-data crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Running query {sql:?}: {source}")]
    Query {
        sql: String,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, DataError>;
