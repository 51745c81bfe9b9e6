//! GraphAssembler: stamping, identity, audit and rollup in one pass
//!
//! Assembly is atomic: either every node passes the provenance
//! completeness check and a Graph is returned, or the whole operation
//! fails. There is no Graph with known-bad nodes — downstream consumers
//! rely on that unconditionally.

use super::audit::provenance_hash;
use super::node::{AuditBlock, Node};
use super::rollup::ProvenanceRollup;
use crate::clock::Clock;
use crate::error::{LineageError, LineageResult};
use crate::identity::{batch_id_v7, BatchId};
use crate::stamp::{ProvenanceStamper, Record, Seed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Graph-level metadata. The rollup is absent in the minimal variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance_rollup: Option<ProvenanceRollup>,
}

/// One assembled batch: a shared batch id, batch metadata, and nodes in
/// input order. Constructed once by [`GraphAssembler`], immutable after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub batch_id: BatchId,
    pub meta: GraphMeta,
    pub nodes: Vec<Node>,
}

/// Check that every node carries complete provenance.
///
/// Runs over the fully constructed node list, never concurrently with
/// construction. A failure here means a node was built through a path
/// that bypassed the stamper — a contract violation, not a retryable
/// condition.
pub fn verify_nodes(nodes: &[Node]) -> LineageResult<()> {
    for (index, node) in nodes.iter().enumerate() {
        let provenance = &node.meta.provenance;
        if provenance.model.is_empty() {
            return Err(LineageError::IncompleteProvenance {
                index,
                field: "model",
            });
        }
        if provenance.seed.is_none() {
            return Err(LineageError::IncompleteProvenance {
                index,
                field: "seed",
            });
        }
        if provenance.ts_iso.is_empty() {
            return Err(LineageError::IncompleteProvenance {
                index,
                field: "ts_iso",
            });
        }
    }
    Ok(())
}

/// Assembles batches of records into provenance graphs.
pub struct GraphAssembler {
    stamper: ProvenanceStamper,
}

impl Default for GraphAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphAssembler {
    /// Create an assembler backed by the system clock
    pub fn new() -> Self {
        Self {
            stamper: ProvenanceStamper::new(),
        }
    }

    /// Create an assembler with an explicit clock
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            stamper: ProvenanceStamper::with_clock(clock),
        }
    }

    /// Assemble a graph with provenance only — no audit blocks, no rollup.
    ///
    /// The full variant, [`GraphAssembler::assemble_graph`], decorates
    /// this result rather than duplicating the assembly path.
    pub fn assemble_minimal(
        &self,
        records: &[Record],
        model: &str,
        seed: &Value,
        base_dt: Option<DateTime<Utc>>,
    ) -> LineageResult<Graph> {
        // Input validation before any timestamp is generated.
        crate::stamp::validate_model(model)?;
        let seed_value = Seed::from_value(seed)?;
        let base = self.stamper.resolve_base(base_dt);
        let stamped = self.stamper.stamp_batch(records, model, seed, Some(base))?;
        let batch_id = batch_id_v7(&base, seed_value);

        let nodes: Vec<Node> = stamped.into_iter().map(Node::from_stamped).collect();
        verify_nodes(&nodes)?;

        tracing::debug!(batch_id = %batch_id, nodes = nodes.len(), "assembled graph");
        Ok(Graph {
            batch_id,
            meta: GraphMeta::default(),
            nodes,
        })
    }

    /// Assemble a graph with per-node audit blocks and a batch rollup.
    ///
    /// Decorates the minimal assembly in a single pass over the same node
    /// order, so rollup accumulation and audit attachment cannot diverge
    /// from node construction order.
    pub fn assemble_graph(
        &self,
        records: &[Record],
        model: &str,
        seed: &Value,
        base_dt: Option<DateTime<Utc>>,
    ) -> LineageResult<Graph> {
        let mut graph = self.assemble_minimal(records, model, seed, base_dt)?;
        let batch_id = graph.batch_id;
        let mut rollup = ProvenanceRollup::default();
        for node in &mut graph.nodes {
            rollup.observe(&node.meta.provenance);
            node.meta.audit = Some(AuditBlock {
                batch_id,
                provenance_hash: provenance_hash(&node.meta.provenance)?,
            });
        }
        graph.meta.provenance_rollup = Some(rollup);
        Ok(graph)
    }
}
