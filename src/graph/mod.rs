//! Core graph data structures and assembly

mod assembler;
mod audit;
mod node;
mod rollup;


pub use assembler::{verify_nodes, Graph, GraphAssembler, GraphMeta};
pub use audit::provenance_hash;
pub use node::{AuditBlock, Node, NodeMeta};
pub use rollup::ProvenanceRollup;
