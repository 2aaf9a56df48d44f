use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{EntityNode, NodeLabel, Relation, Triplet};
use crate::node::SchemaNode;
use crate::{ExtractError, ExtractResult};

/// Separator between a table name and a column name in composite names.
const NAME_DELIMITER: &str = "::";

const DEFAULT_REL_COLUMN: &str = "include";
const DEFAULT_REL_FOREIGN_KEY: &str = "foreign_key";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Root directory holding per-table column listings under `columns/`.
    pub directory: String,
    /// Relation label for table/column membership. Empty means the default.
    #[serde(default)]
    pub rel_column: String,
    /// Relation label for cross-table references. Empty means the default.
    #[serde(default)]
    pub rel_foreign_key: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
            rel_column: String::new(),
            rel_foreign_key: String::new(),
        }
    }
}

/// Transform pass that turns schema description records into graph triplets.
///
/// Each record's content is one logical line: either a foreign-key
/// descriptor (`table1,column1,table2,column2`) or a bare table name resolved
/// against `{directory}/columns/{table}.csv`. Lines that fit neither shape
/// produce no triplets; partial input degrades coverage instead of aborting
/// the batch.
pub struct TripletExtractor {
    directory: String,
    rel_column: String,
    rel_foreign_key: String,
}

impl TripletExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        let rel_column = config.rel_column.trim();
        let rel_foreign_key = config.rel_foreign_key.trim();

        Self {
            directory: config.directory.trim().to_string(),
            rel_column: if rel_column.is_empty() {
                DEFAULT_REL_COLUMN.to_string()
            } else {
                rel_column.to_string()
            },
            rel_foreign_key: if rel_foreign_key.is_empty() {
                DEFAULT_REL_FOREIGN_KEY.to_string()
            } else {
                rel_foreign_key.to_string()
            },
        }
    }

    /// Augments each record's metadata with the extracted entities and
    /// relations, handing the records back in input order.
    ///
    /// Lists accumulated by earlier passes are extended, never replaced.
    pub fn transform(&self, nodes: Vec<SchemaNode>) -> ExtractResult<Vec<SchemaNode>> {
        nodes
            .into_iter()
            .map(|node| self.transform_node(node))
            .collect()
    }

    fn transform_node(&self, mut node: SchemaNode) -> ExtractResult<SchemaNode> {
        let triplets = self.extract_triplets(node.content())?;

        let mut graph_nodes = node.take_kg_nodes()?;
        let mut graph_relations = node.take_kg_relations()?;

        // Captured once per record, after the carried lists are removed.
        // Every entity and relation owns its own copy.
        let properties = node.metadata.clone();

        for Triplet {
            subject,
            relation,
            object,
        } in triplets
        {
            let subj = EntityNode::new(subject, NodeLabel::Table, properties.clone());
            let obj = EntityNode::new(object, NodeLabel::Column, properties.clone());
            let rel = Relation::new(relation, subj.id, obj.id, properties.clone());

            graph_nodes.push(subj);
            graph_nodes.push(obj);
            graph_relations.push(rel);
        }

        node.put_kg_nodes(graph_nodes)?;
        node.put_kg_relations(graph_relations)?;

        Ok(node)
    }

    fn extract_triplets(&self, text: &str) -> ExtractResult<Vec<Triplet>> {
        let content = text.trim();

        if content.contains(',') {
            return Ok(self.extract_foreign_keys(content));
        }

        self.extract_columns(content)
    }

    /// `table1,column1,table2,column2` → one foreign-key triplet.
    ///
    /// Wrong arity or empty tokens yield nothing rather than an error; token
    /// order is not validated beyond non-emptiness.
    fn extract_foreign_keys(&self, text: &str) -> Vec<Triplet> {
        let words: Vec<&str> = text.splitn(4, ',').collect();
        if words.len() != 4 {
            debug!(line = text, "foreign-key descriptor with wrong arity");
            return Vec::new();
        }

        let (t1, c1) = (words[0].trim(), words[1].trim());
        let (t2, c2) = (words[2].trim(), words[3].trim());

        if t1.is_empty() || t2.is_empty() || c1.is_empty() || c2.is_empty() {
            debug!(line = text, "foreign-key descriptor with empty tokens");
            return Vec::new();
        }

        vec![Triplet::new(
            qualified_name(t1, c1),
            self.rel_foreign_key.as_str(),
            qualified_name(t2, c2),
        )]
    }

    /// Bare table name → one membership triplet per listed column.
    fn extract_columns(&self, table: &str) -> ExtractResult<Vec<Triplet>> {
        if self.directory.is_empty() {
            return Err(ExtractError::MissingDirectory);
        }

        let column_file = Path::new(&self.directory)
            .join("columns")
            .join(format!("{table}.csv"));
        if !column_file.is_file() {
            debug!(table, file = %column_file.display(), "no column listing");
            return Ok(Vec::new());
        }

        let listing = fs::read_to_string(&column_file)?;

        let mut triplets = Vec::new();

        // skip the header line
        for line in listing.lines().skip(1) {
            let column = line.trim();
            if column.is_empty() || column.starts_with('#') || column.starts_with(';') {
                continue;
            }

            triplets.push(Triplet::new(
                table,
                self.rel_column.as_str(),
                qualified_name(table, column),
            ));
        }

        Ok(triplets)
    }
}

fn qualified_name(table: &str, column: &str) -> String {
    if table.is_empty() {
        column.to_string()
    } else {
        format!("{table}{NAME_DELIMITER}{column}")
    }
}
