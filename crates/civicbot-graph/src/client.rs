//! Pooled connection to the content graph.

use neo4rs::{ConfigBuilder, Graph, Query, Row, Txn};

use civicbot_core::config::GraphSettings;

use crate::error::GraphError;

/// Neo4j-backed content graph. Clone is cheap (the pool is shared).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Open a connection pool using the `[graph]` settings.
    pub async fn connect(settings: &GraphSettings) -> Result<Self, GraphError> {
        let connection_error = |e: neo4rs::Error| GraphError::Connection {
            uri: settings.uri.clone(),
            reason: e.to_string(),
        };

        let config = ConfigBuilder::default()
            .uri(&settings.uri)
            .user(&settings.user)
            .password(&settings.password)
            .max_connections(settings.max_connections as usize)
            .fetch_size(settings.fetch_size)
            .build()
            .map_err(connection_error)?;
        let graph = Graph::connect(config).await.map_err(connection_error)?;

        tracing::info!(uri = %settings.uri, user = %settings.user, "Connected to content graph");
        Ok(Self { graph })
    }

    /// Run a statement whose result rows are not needed.
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        Ok(self.graph.run(query).await?)
    }

    /// First row of a query's result, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<Row>, GraphError> {
        let mut rows = self.graph.execute(query).await?;
        Ok(rows.next().await?)
    }

    pub(crate) async fn start_txn(&self) -> Result<Txn, GraphError> {
        Ok(self.graph.start_txn().await?)
    }
}
