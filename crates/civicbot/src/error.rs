//! Error types for the civicbot crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("{0}")]
    Llm(#[from] civicbot_llm::LlmError),

    #[error("{0}")]
    Decode(#[from] civicbot_core::CoreError),

    #[error("Loading results: {0}")]
    Data(#[from] civicbot_data::DataError),

    #[error("The model could not write SQL for this question: {missing_data}")]
    NoQuery {
        applicability: String,
        missing_data: String,
    },

    #[error("Rendering module body: {0}")]
    Render(#[from] askama::Error),

    #[error("No graph store configured")]
    NoGraphStore,

    #[error("{context}: {source}")]
    Graph {
        context: &'static str,
        #[source]
        source: civicbot_graph::GraphError,
    },
}

impl BotError {
    pub(crate) fn graph(context: &'static str) -> impl FnOnce(civicbot_graph::GraphError) -> Self {
        move |source| BotError::Graph { context, source }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
