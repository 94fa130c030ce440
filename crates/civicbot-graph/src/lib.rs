//! civicbot-graph: Neo4j client for the content graph.
//!
//! Published visualizations live in the content graph as `:Module` vertices
//! carrying their metadata, body HTML, and chart JS. All writes flow
//! through the [`ContentStore`] trait so the bot can run without a graph.

pub mod client;
pub mod error;
pub mod module;
pub mod store;

pub use client::GraphClient;
pub use error::GraphError;
pub use module::{Module, VertexQuery};
pub use store::ContentStore;
