//! Schema-to-graph extraction passes.
//!
//! Turns line-oriented schema descriptions (table names and foreign-key
//! descriptors) into knowledge-graph entities and relations, carried on each
//! record's metadata so later passes can pick them up.

pub mod extractor;
pub mod graph;
pub mod node;
pub mod splitter;

pub use extractor::{ExtractorConfig, TripletExtractor};
pub use graph::{EntityNode, NodeLabel, Relation, Triplet};
pub use node::{KG_NODES_KEY, KG_RELATIONS_KEY, SchemaNode};
pub use splitter::LineSplitter;

use thiserror::Error;

/// Extraction errors.
///
/// Malformed input lines are not errors; they simply produce no triplets.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// A table-name record was hit while no columns directory is configured.
    #[error("columns directory is not configured")]
    MissingDirectory,

    /// A column listing exists but could not be read.
    #[error("failed to read column listing: {0}")]
    Io(#[from] std::io::Error),

    /// A record carried graph metadata that does not decode.
    #[error("malformed graph metadata: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub type ExtractResult<T> = Result<T, ExtractError>;
