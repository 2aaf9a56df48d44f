use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A (subject, relation, object) fact destined for the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triplet {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeLabel {
    Table,
    Column,
}

/// A named, labeled node in the knowledge graph.
///
/// Identity is fresh per creation: extracting the same name twice yields two
/// nodes with equal names but distinct ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityNode {
    pub id: Uuid,
    pub name: String,
    pub label: NodeLabel,
    pub properties: Map<String, Value>,
}

impl EntityNode {
    pub fn new(name: impl Into<String>, label: NodeLabel, properties: Map<String, Value>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            label,
            properties,
        }
    }
}

/// A labeled, directed edge between two entity identities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub label: String,
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub properties: Map<String, Value>,
}

impl Relation {
    pub fn new(
        label: impl Into<String>,
        source_id: Uuid,
        target_id: Uuid,
        properties: Map<String, Value>,
    ) -> Self {
        Self {
            label: label.into(),
            source_id,
            target_id,
            properties,
        }
    }
}
