//! Batch-level provenance rollup

use crate::stamp::ProvenanceBlock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Aggregate summary of a batch: distinct models and seeds plus the
/// timestamp range. `ts_min`/`ts_max` are null for an empty batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceRollup {
    pub models: BTreeSet<String>,
    pub seeds: BTreeSet<i64>,
    pub ts_max: Option<String>,
    pub ts_min: Option<String>,
}

impl ProvenanceRollup {
    /// Fold one provenance block into the rollup.
    ///
    /// RFC3339 second-precision timestamps are fixed-width, so the min/max
    /// comparison is plain string ordering.
    pub fn observe(&mut self, provenance: &ProvenanceBlock) {
        self.models.insert(provenance.model.clone());
        if let Some(seed) = provenance.seed {
            self.seeds.insert(seed.value());
        }
        let ts = &provenance.ts_iso;
        match &self.ts_min {
            Some(min) if min <= ts => {}
            _ => self.ts_min = Some(ts.clone()),
        }
        match &self.ts_max {
            Some(max) if max >= ts => {}
            _ => self.ts_max = Some(ts.clone()),
        }
    }
}
