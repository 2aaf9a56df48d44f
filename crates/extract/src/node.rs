use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::ExtractResult;
use crate::graph::{EntityNode, Relation};

/// Metadata key carrying accumulated graph entities across passes.
pub const KG_NODES_KEY: &str = "kg_nodes";
/// Metadata key carrying accumulated graph relations across passes.
pub const KG_RELATIONS_KEY: &str = "kg_relations";

/// One record of schema description text flowing through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaNode {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SchemaNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_metadata(text, Map::new())
    }

    pub fn with_metadata(text: impl Into<String>, metadata: Map<String, Value>) -> Self {
        let text = text.into();

        Self {
            id: generate_node_id(&text),
            text,
            metadata,
        }
    }

    /// Record content with no metadata mixed in.
    pub fn content(&self) -> &str {
        &self.text
    }

    /// Decoded view of the accumulated entities; an absent key means none.
    pub fn kg_nodes(&self) -> ExtractResult<Vec<EntityNode>> {
        read_list(&self.metadata, KG_NODES_KEY)
    }

    /// Decoded view of the accumulated relations; an absent key means none.
    pub fn kg_relations(&self) -> ExtractResult<Vec<Relation>> {
        read_list(&self.metadata, KG_RELATIONS_KEY)
    }

    /// Removes and decodes the accumulated entities.
    pub(crate) fn take_kg_nodes(&mut self) -> ExtractResult<Vec<EntityNode>> {
        take_list(&mut self.metadata, KG_NODES_KEY)
    }

    /// Removes and decodes the accumulated relations.
    pub(crate) fn take_kg_relations(&mut self) -> ExtractResult<Vec<Relation>> {
        take_list(&mut self.metadata, KG_RELATIONS_KEY)
    }

    pub(crate) fn put_kg_nodes(&mut self, nodes: Vec<EntityNode>) -> ExtractResult<()> {
        self.metadata
            .insert(KG_NODES_KEY.to_string(), serde_json::to_value(nodes)?);
        Ok(())
    }

    pub(crate) fn put_kg_relations(&mut self, relations: Vec<Relation>) -> ExtractResult<()> {
        self.metadata
            .insert(KG_RELATIONS_KEY.to_string(), serde_json::to_value(relations)?);
        Ok(())
    }
}

fn read_list<T>(metadata: &Map<String, Value>, key: &str) -> ExtractResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    match metadata.get(key) {
        Some(value) => Ok(serde_json::from_value(value.clone())?),
        None => Ok(Vec::new()),
    }
}

fn take_list<T>(metadata: &mut Map<String, Value>, key: &str) -> ExtractResult<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    match metadata.remove(key) {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(Vec::new()),
    }
}

/// Stable record id from content
fn generate_node_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}
