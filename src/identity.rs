//! Deterministic batch identifiers
//!
//! A batch id is shaped like a UUIDv7 but carries no randomness and no
//! wall-clock entropy beyond the caller-supplied base instant: all 128
//! bits come from `SHA-256("{epoch_millis}:{seed}")`. Same inputs always
//! produce the same id, which is what lets reruns be diffed against
//! earlier runs. Consumers must not assume real UUIDv7 uniqueness
//! guarantees; the v7/variant bits are presentation only.

use crate::stamp::{to_utc_seconds, Seed};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Content-derived identifier shared by every node in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(Uuid);

impl BatchId {
    /// Create a BatchId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Derive the batch id for `(base_dt, seed)`.
///
/// The base instant is normalized to UTC seconds, converted to epoch
/// milliseconds, and hashed as the ASCII string `"{epoch_millis}:{seed}"`
/// — that exact format is the cross-implementation contract. The first 16
/// digest bytes become the id, with the version nibble forced to 7 and
/// the variant bits forced to RFC-4122 `10`.
pub fn batch_id_v7<Tz: TimeZone>(base_dt: &DateTime<Tz>, seed: Seed) -> BatchId {
    let millis = to_utc_seconds(base_dt).timestamp_millis();
    let digest = Sha256::digest(format!("{}:{}", millis, seed).as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    bytes[6] = 0x70 | (bytes[6] & 0x0f);
    bytes[8] = 0x80 | (bytes[8] & 0x3f);
    BatchId(Uuid::from_bytes(bytes))
}
