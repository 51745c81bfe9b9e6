//! Lineage: Deterministic Provenance Graph Assembly
//!
//! Assembles batches of raw records into versioned, auditable graphs:
//! every record is stamped with deterministic, monotonically increasing
//! timestamps and a content-derived batch identifier, every node carries
//! a machine-checkable provenance block, and later batches can be
//! correlated against earlier ones on an arbitrary key field.
//!
//! # Core Concepts
//!
//! - **Provenance**: the `{model, seed, ts_iso}` triple recording what
//!   produced a record and when, under a deterministic clock
//! - **Batch**: one ordered collection of records assembled together under
//!   a shared, reproducible batch identifier
//! - **Correlation**: joining records across batches on a key field to
//!   trace a key's lineage through batch history
//!
//! Reproducibility is the design goal: the same inputs (model, seed,
//! base instant) always produce the same batch id and the same per-record
//! timestamps, no matter when or how often the pipeline reruns.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use lineage::{GraphAssembler, Record};
//! use serde_json::json;
//!
//! let records: Vec<Record> = vec![
//!     json!({"i": 1}).as_object().unwrap().clone(),
//!     json!({"i": 2}).as_object().unwrap().clone(),
//! ];
//! let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
//! let assembler = GraphAssembler::new();
//! let graph = assembler
//!     .assemble_graph(&records, "qwen2.5", &json!(7), Some(base))
//!     .unwrap();
//! assert_eq!(graph.nodes.len(), 2);
//! ```

mod clock;
mod correlate;
mod error;
mod graph;
mod identity;
mod stamp;

pub use clock::{Clock, FixedClock, SystemClock};
pub use correlate::{correlate_nodes_across_batches, Correlation};
pub use error::{LineageError, LineageResult};
pub use graph::{
    provenance_hash, verify_nodes, AuditBlock, Graph, GraphAssembler, GraphMeta, Node, NodeMeta,
    ProvenanceRollup,
};
pub use identity::{batch_id_v7, BatchId};
pub use stamp::{to_utc_seconds, ProvenanceBlock, ProvenanceStamper, Record, Seed};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
