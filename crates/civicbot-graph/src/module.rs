//! Module pages and how they are addressed in the content graph.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GraphError;

const MODULE_LABEL: &str = "Module";

const BASE62: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// A published page in the content graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Module {
    /// UUID string. Validated lazily by [`Module::vertex_query`] and [`Module::slug_id`].
    pub id: String,
    pub name: String,
    pub headline: String,
    pub categories: Vec<String>,
    pub creators: Vec<String>,
    /// Map camera position(s), keyed by view name.
    pub camera: serde_json::Value,
    pub feature_image: String,
    pub description: String,
    /// `YYYY-MM-DD`.
    pub pub_date: String,
    pub code_credit: String,
}

/// Identifies the vertex that body text and JS attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexQuery {
    pub label: &'static str,
    pub id: Uuid,
}

impl VertexQuery {
    /// Cypher pattern matching this vertex, bound to `$vertex_id`.
    pub fn match_pattern(&self) -> String {
        format!("(v:{} {{id: $vertex_id}})", self.label)
    }
}

impl Module {
    fn uuid(&self) -> Result<Uuid, GraphError> {
        Uuid::parse_str(&self.id).map_err(|source| GraphError::InvalidId {
            id: self.id.clone(),
            source,
        })
    }

    /// Query addressing this module's vertex.
    pub fn vertex_query(&self) -> Result<VertexQuery, GraphError> {
        Ok(VertexQuery {
            label: MODULE_LABEL,
            id: self.uuid()?,
        })
    }

    /// Compact URL identifier: the UUID in base 62.
    pub fn slug_id(&self) -> Result<String, GraphError> {
        Ok(base62(self.uuid()?.as_u128()))
    }

    /// URL-friendly title: lower-case, non-alphanumeric runs collapsed to `-`.
    pub fn slug_title(&self) -> String {
        let mut slug = String::with_capacity(self.name.len());
        let mut pending_dash = false;
        for c in self.name.chars() {
            if c.is_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.extend(c.to_lowercase());
            } else {
                pending_dash = true;
            }
        }
        slug
    }
}

fn base62(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE62[(n % 62) as usize] as char);
        n /= 62;
    }
    digits.iter().rev().collect()
}
