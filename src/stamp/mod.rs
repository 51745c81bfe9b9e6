//! Provenance stamping: deterministic {model, seed, ts_iso} blocks for
//! single records and whole batches.

mod seed;
mod stamper;

pub use seed::Seed;
pub(crate) use stamper::validate_model;
pub use stamper::{to_utc_seconds, ProvenanceBlock, ProvenanceStamper, Record};
