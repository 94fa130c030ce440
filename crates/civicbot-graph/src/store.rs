//! Write operations for published modules.
//!
//! The module vertex uses MERGE (upsert) semantics keyed by id, so
//! republishing the same module overwrites it. Body text and JS attach to an
//! existing vertex and fail with `NotFound` otherwise.

use async_trait::async_trait;
use chrono::Utc;
use neo4rs::query;

use crate::client::GraphClient;
use crate::error::GraphError;
use crate::module::{Module, VertexQuery};

/// The subset of the content graph the bot writes to.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upsert the module vertex with its metadata.
    async fn write_module(&self, module: &Module) -> Result<(), GraphError>;

    /// Attach the rendered HTML body to a vertex.
    async fn write_body_text(&self, vertex: &VertexQuery, body: &str) -> Result<(), GraphError>;

    /// Attach the module's JS to a vertex.
    async fn write_js(&self, vertex: &VertexQuery, js: &str) -> Result<(), GraphError>;
}

#[async_trait]
impl ContentStore for GraphClient {
    async fn write_module(&self, module: &Module) -> Result<(), GraphError> {
        let vertex = module.vertex_query()?;
        let camera = serde_json::to_string(&module.camera)?;
        let now = Utc::now().to_rfc3339();

        let q = query(
            "MERGE (m:Module {id: $id})
             ON CREATE SET m.created_at = $now
             SET m.name = $name, m.headline = $headline,
                 m.categories = $categories, m.creators = $creators,
                 m.camera = $camera, m.feature_image = $feature_image,
                 m.description = $description, m.pub_date = $pub_date,
                 m.code_credit = $code_credit, m.slug_title = $slug_title,
                 m.updated_at = $now",
        )
        .param("id", vertex.id.to_string())
        .param("name", module.name.clone())
        .param("headline", module.headline.clone())
        .param("categories", module.categories.clone())
        .param("creators", module.creators.clone())
        .param("camera", camera)
        .param("feature_image", module.feature_image.clone())
        .param("description", module.description.clone())
        .param("pub_date", module.pub_date.clone())
        .param("code_credit", module.code_credit.clone())
        .param("slug_title", module.slug_title())
        .param("now", now);

        // The module and its links land together or not at all.
        let mut txn = self.start_txn().await?;
        txn.run(q).await?;

        // Category and creator vertices are shared across modules.
        let q = query(
            "MATCH (m:Module {id: $id})
             UNWIND $categories AS category
             MERGE (c:Category {name: category})
             MERGE (m)-[:IN_CATEGORY]->(c)",
        )
        .param("id", vertex.id.to_string())
        .param("categories", module.categories.clone());
        txn.run(q).await?;

        let q = query(
            "MATCH (m:Module {id: $id})
             UNWIND $creators AS creator
             MERGE (p:Creator {name: creator})
             MERGE (p)-[:CREATED]->(m)",
        )
        .param("id", vertex.id.to_string())
        .param("creators", module.creators.clone());
        txn.run(q).await?;
        txn.commit().await?;

        tracing::info!(module_id = %vertex.id, name = %module.name, "Module written");
        Ok(())
    }

    async fn write_body_text(&self, vertex: &VertexQuery, body: &str) -> Result<(), GraphError> {
        self.set_vertex_text(vertex, "body_text", body).await
    }

    async fn write_js(&self, vertex: &VertexQuery, js: &str) -> Result<(), GraphError> {
        self.set_vertex_text(vertex, "js", js).await
    }
}

impl GraphClient {
    /// Set a text property on an existing vertex. `property` is a fixed identifier, never user input.
    async fn set_vertex_text(
        &self,
        vertex: &VertexQuery,
        property: &str,
        value: &str,
    ) -> Result<(), GraphError> {
        let cypher = format!(
            "MATCH {pattern}
             SET v.{property} = $value, v.updated_at = $now
             RETURN v.id AS id",
            pattern = vertex.match_pattern(),
        );

        let q = query(&cypher)
            .param("vertex_id", vertex.id.to_string())
            .param("value", value.to_string())
            .param("now", Utc::now().to_rfc3339());

        match self.query_one(q).await? {
            Some(_) => {
                tracing::debug!(vertex_id = %vertex.id, property, bytes = value.len(), "Vertex text written");
                Ok(())
            }
            None => Err(GraphError::NotFound {
                label: vertex.label.to_string(),
                id: vertex.id.to_string(),
            }),
        }
    }
}
