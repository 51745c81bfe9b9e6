//! ProvenanceStamper: attaches provenance to records with monotonic
//! per-index timestamps.
//!
//! The reproducible path takes an explicit base instant; the convenience
//! path reads the injected clock. Both share one implementation, so the
//! convenience path differs only in where the base instant comes from.

use super::seed::Seed;
use crate::clock::{Clock, SystemClock};
use crate::error::{LineageError, LineageResult};
use chrono::{DateTime, Duration, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An open key-value record. The caller owns the schema; stamping only
/// merges the three provenance fields in.
pub type Record = serde_json::Map<String, Value>;

/// The {model, seed, ts_iso} triple recording what produced a record and
/// when, under a deterministic clock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceBlock {
    /// Preserved verbatim when supplied, including blank strings; omitted
    /// from serialization only on true absence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
    pub model: String,
    /// `None` marks a record whose seed never went through the stamper;
    /// the assembly invariant check treats it as incomplete provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,
    /// RFC3339, UTC, second precision, literal `Z` suffix
    pub ts_iso: String,
}

/// Normalize any instant to UTC and truncate to whole seconds.
pub fn to_utc_seconds<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<Utc> {
    dt.with_timezone(&Utc).trunc_subsecs(0)
}

/// Format a UTC instant as RFC3339 with second precision and `Z` suffix.
pub(crate) fn format_ts(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

pub(crate) fn validate_model(model: &str) -> LineageResult<()> {
    if model.is_empty() {
        return Err(LineageError::InvalidProvenance(
            "model must be a non-empty string".to_string(),
        ));
    }
    Ok(())
}

/// Stamps records with provenance.
///
/// Holds the clock used when no explicit base instant is supplied.
pub struct ProvenanceStamper {
    clock: Box<dyn Clock>,
}

impl Default for ProvenanceStamper {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvenanceStamper {
    /// Create a stamper backed by the system clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a stamper with an explicit clock
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    /// Resolve the base instant: the caller's (normalized) when given,
    /// otherwise the clock's current UTC second.
    pub(crate) fn resolve_base(&self, base_dt: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match base_dt {
            Some(dt) => to_utc_seconds(&dt),
            None => to_utc_seconds(&self.clock.now_utc()),
        }
    }

    /// Build a single provenance block stamped with the current clock
    /// instant.
    ///
    /// Fails with [`LineageError::InvalidProvenance`] on an empty model or
    /// a seed that is a boolean or not losslessly an integer — always
    /// before the clock is read.
    pub fn ensure_provenance(
        &self,
        model: &str,
        seed: &Value,
        analysis: Option<&str>,
    ) -> LineageResult<ProvenanceBlock> {
        validate_model(model)?;
        let seed = Seed::from_value(seed)?;
        let now = to_utc_seconds(&self.clock.now_utc());
        Ok(ProvenanceBlock {
            analysis: analysis.map(str::to_string),
            model: model.to_string(),
            seed: Some(seed),
            ts_iso: format_ts(&now),
        })
    }

    /// Stamp a batch of records with `{model, seed, ts_iso}`, one second
    /// apart per index.
    ///
    /// The record at index `i` gets `ts_iso = base + i` seconds, so the
    /// timestamp sequence is strictly increasing by construction. Output
    /// preserves length and order; inputs are copied, never mutated.
    /// Pre-existing `model`/`seed`/`ts_iso` keys are overwritten.
    ///
    /// Without `base_dt` the clock supplies the base — that path is for
    /// interactive use and is not reproducible across runs.
    pub fn stamp_batch(
        &self,
        records: &[Record],
        model: &str,
        seed: &Value,
        base_dt: Option<DateTime<Utc>>,
    ) -> LineageResult<Vec<Record>> {
        validate_model(model)?;
        let seed = Seed::from_value(seed)?;
        let base = self.resolve_base(base_dt);
        let stamped = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let ts = base + Duration::seconds(i as i64);
                let mut out = record.clone();
                out.insert("model".to_string(), Value::String(model.to_string()));
                out.insert("seed".to_string(), Value::from(seed.value()));
                out.insert("ts_iso".to_string(), Value::String(format_ts(&ts)));
                out
            })
            .collect();
        Ok(stamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::{FixedOffset, TimeZone};
    use serde_json::json;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let mut r = Record::new();
                r.insert("idx".to_string(), json!(i));
                r
            })
            .collect()
    }

    #[test]
    fn timestamps_increase_by_one_second() {
        let stamper = ProvenanceStamper::new();
        let out = stamper
            .stamp_batch(&records(3), "m", &json!(1), Some(base()))
            .unwrap();
        let ts: Vec<&str> = out.iter().map(|r| r["ts_iso"].as_str().unwrap()).collect();
        assert_eq!(
            ts,
            vec![
                "2025-01-01T00:00:00Z",
                "2025-01-01T00:00:01Z",
                "2025-01-01T00:00:02Z"
            ]
        );
    }

    #[test]
    fn order_is_preserved() {
        let stamper = ProvenanceStamper::new();
        let out = stamper
            .stamp_batch(&records(5), "m", &json!(1), Some(base()))
            .unwrap();
        let idx: Vec<i64> = out.iter().map(|r| r["idx"].as_i64().unwrap()).collect();
        assert_eq!(idx, vec![0, 1, 2, 3, 4]);
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn seed_does_not_affect_timestamps() {
        let stamper = ProvenanceStamper::new();
        let a = stamper
            .stamp_batch(&records(4), "m", &json!(1), Some(base()))
            .unwrap();
        let b = stamper
            .stamp_batch(&records(4), "m", &json!(2), Some(base()))
            .unwrap();
        for (ra, rb) in a.iter().zip(&b) {
            assert_eq!(ra["ts_iso"], rb["ts_iso"]);
            assert_ne!(ra["seed"], rb["seed"]);
        }
    }

    #[test]
    fn stamping_overwrites_reserved_keys_and_keeps_the_rest() {
        let mut r = Record::new();
        r.insert("model".to_string(), json!("stale"));
        r.insert("payload".to_string(), json!({"a": 1}));
        let stamper = ProvenanceStamper::new();
        let out = stamper
            .stamp_batch(&[r.clone()], "fresh", &json!(9), Some(base()))
            .unwrap();
        assert_eq!(out[0]["model"], json!("fresh"));
        assert_eq!(out[0]["payload"], json!({"a": 1}));
        // the input record is untouched
        assert_eq!(r["model"], json!("stale"));
    }

    #[test]
    fn identical_inputs_stamp_identically() {
        let stamper = ProvenanceStamper::new();
        let a = stamper
            .stamp_batch(&records(3), "m", &json!(5), Some(base()))
            .unwrap();
        let b = stamper
            .stamp_batch(&records(3), "m", &json!(5), Some(base()))
            .unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn non_utc_base_is_converted() {
        let offset = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let local = offset.with_ymd_and_hms(2025, 1, 1, 5, 30, 0).unwrap();
        let stamper = ProvenanceStamper::new();
        let out = stamper
            .stamp_batch(&records(1), "m", &json!(1), Some(to_utc_seconds(&local)))
            .unwrap();
        assert_eq!(out[0]["ts_iso"], json!("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn subsecond_precision_is_truncated() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + Duration::milliseconds(750);
        assert_eq!(format_ts(&to_utc_seconds(&dt)), "2025-01-01T00:00:00Z");
    }

    #[test]
    fn ensure_provenance_uses_the_injected_clock() {
        let stamper = ProvenanceStamper::with_clock(FixedClock(base()));
        let block = stamper.ensure_provenance("m", &json!(7), None).unwrap();
        assert_eq!(block.model, "m");
        assert_eq!(block.seed.unwrap().value(), 7);
        assert_eq!(block.ts_iso, "2025-01-01T00:00:00Z");
        assert!(block.analysis.is_none());
    }

    #[test]
    fn ensure_provenance_rejects_boolean_seed() {
        let stamper = ProvenanceStamper::new();
        let err = stamper.ensure_provenance("m", &json!(true), None).unwrap_err();
        assert!(matches!(err, LineageError::InvalidProvenance(_)));
    }

    #[test]
    fn ensure_provenance_rejects_empty_model() {
        let stamper = ProvenanceStamper::new();
        assert!(matches!(
            stamper.ensure_provenance("", &json!(1), None),
            Err(LineageError::InvalidProvenance(_))
        ));
    }

    #[test]
    fn blank_analysis_is_preserved_verbatim() {
        let stamper = ProvenanceStamper::with_clock(FixedClock(base()));
        let blank = stamper.ensure_provenance("m", &json!(1), Some("")).unwrap();
        assert_eq!(blank.analysis.as_deref(), Some(""));
        let ws = stamper
            .ensure_provenance("m", &json!(1), Some("  "))
            .unwrap();
        assert_eq!(ws.analysis.as_deref(), Some("  "));

        let json = serde_json::to_value(&blank).unwrap();
        assert_eq!(json["analysis"], json!(""));
        let absent = stamper.ensure_provenance("m", &json!(1), None).unwrap();
        let json = serde_json::to_value(&absent).unwrap();
        assert!(json.get("analysis").is_none());
    }

    #[test]
    fn invalid_seed_rejected_in_stamp_batch() {
        let stamper = ProvenanceStamper::new();
        assert!(matches!(
            stamper.stamp_batch(&records(1), "m", &json!(true), Some(base())),
            Err(LineageError::InvalidProvenance(_))
        ));
    }
}
