//! Node representation in the provenance graph

use crate::identity::BatchId;
use crate::stamp::{ProvenanceBlock, Record, Seed};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-node audit trail: the batch this node belongs to and a stable hash
/// of its provenance block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditBlock {
    pub batch_id: BatchId,
    /// Lowercase hex SHA-256 of the canonical provenance serialization
    pub provenance_hash: String,
}

/// Node metadata: provenance always, audit in the full assembly variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit: Option<AuditBlock>,
    pub provenance: ProvenanceBlock,
}

/// A node in the provenance graph: the stamped record plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub data: Record,
    pub meta: NodeMeta,
}

impl Node {
    /// Build a node from a stamped record, extracting the provenance
    /// triple back out of the record's reserved fields.
    ///
    /// Extraction is lenient — absent or mistyped fields come back empty
    /// (or `None` for the seed) and are caught by the post-construction
    /// invariant check, not here. A mistyped seed is never coerced; it
    /// stays absent rather than becoming a fabricated value.
    pub fn from_stamped(data: Record) -> Self {
        let provenance = ProvenanceBlock {
            analysis: None,
            model: data
                .get("model")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            seed: data.get("seed").and_then(Value::as_i64).map(Seed::from),
            ts_iso: data
                .get("ts_iso")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        };
        Self {
            data,
            meta: NodeMeta {
                audit: None,
                provenance,
            },
        }
    }
}
