//! Audit hashing of provenance blocks
//!
//! The hash must be reproducible byte-for-byte across implementations, so
//! the input is pinned down exactly: the `{model, seed, ts_iso}` mapping
//! (never the enclosing record), serialized with lexicographically sorted
//! keys and no insignificant whitespace, hashed with SHA-256, rendered as
//! lowercase hex.

use crate::error::{LineageError, LineageResult};
use crate::stamp::ProvenanceBlock;
use serde_json::json;
use sha2::{Digest, Sha256};

/// Stable hash of a provenance block for per-node audit trails.
///
/// The canonical form requires all three fields; a block without a seed
/// cannot be hashed.
pub fn provenance_hash(provenance: &ProvenanceBlock) -> LineageResult<String> {
    let seed = provenance.seed.ok_or_else(|| {
        LineageError::InvalidProvenance("provenance block has no seed".to_string())
    })?;
    // serde_json maps are BTreeMap-backed here, so keys come out sorted.
    let canonical = json!({
        "model": provenance.model,
        "seed": seed.value(),
        "ts_iso": provenance.ts_iso,
    });
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
