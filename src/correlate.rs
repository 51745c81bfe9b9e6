//! Cross-batch correlation
//!
//! Joins nodes across an ordered sequence of assembled graphs on an
//! arbitrary key field, producing each key's batch lineage. Read-only over
//! its inputs; a Graph is never mutated after assembly.

use crate::graph::Graph;
use crate::identity::BatchId;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Mapping from key value to the ordered batch ids that key appeared in,
/// iterated in first-seen key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Correlation {
    order: Vec<String>,
    entries: HashMap<String, Vec<BatchId>>,
}

impl Correlation {
    /// Batch history for a key, in append order
    pub fn get(&self, key: &str) -> Option<&[BatchId]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Iterate entries in first-seen key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BatchId])> + '_ {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.entries[key].as_slice()))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Append a batch id to a key's history unless it repeats the last
    /// entry. Non-consecutive repeats are kept.
    fn push(&mut self, key: String, batch_id: BatchId) {
        let history = match self.entries.get_mut(&key) {
            Some(history) => history,
            None => {
                self.order.push(key.clone());
                self.entries.entry(key).or_default()
            }
        };
        if history.last() != Some(&batch_id) {
            history.push(batch_id);
        }
    }
}

impl Serialize for Correlation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.order.len()))?;
        for (key, history) in self.iter() {
            map.serialize_entry(key, history)?;
        }
        map.end()
    }
}

/// Join nodes across batches on `key_field`.
///
/// Graphs are visited in input order, nodes in node order. Nodes without
/// the key field (or with a null value) are skipped. Never fails; an
/// empty input yields an empty mapping.
pub fn correlate_nodes_across_batches(graphs: &[Graph], key_field: &str) -> Correlation {
    let mut correlation = Correlation::default();
    for graph in graphs {
        for node in &graph.nodes {
            let Some(key) = node.data.get(key_field).and_then(value_key) else {
                continue;
            };
            correlation.push(key, graph.batch_id);
        }
    }
    correlation
}

/// Map key: strings key by their raw text, any other non-null value by
/// its compact JSON rendering, so `1` and `"1"` stay distinct.
fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphAssembler;
    use crate::stamp::Record;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    fn base(sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, sec).unwrap()
    }

    fn graph(keys: &[Value], seed: i64, at: DateTime<Utc>) -> Graph {
        let records: Vec<Record> = keys
            .iter()
            .map(|k| {
                let mut r = Record::new();
                r.insert("entity".to_string(), k.clone());
                r
            })
            .collect();
        GraphAssembler::new()
            .assemble_graph(&records, "m", &json!(seed), Some(at))
            .unwrap()
    }

    #[test]
    fn keys_track_their_batch_lineage() {
        let g1 = graph(&[json!("a"), json!("b")], 1, base(0));
        let g2 = graph(&[json!("b"), json!("c")], 2, base(10));
        let correlation =
            correlate_nodes_across_batches(&[g1.clone(), g2.clone()], "entity");

        assert_eq!(correlation.get("a").unwrap(), &[g1.batch_id]);
        assert_eq!(correlation.get("b").unwrap(), &[g1.batch_id, g2.batch_id]);
        assert_eq!(correlation.get("c").unwrap(), &[g2.batch_id]);
    }

    #[test]
    fn consecutive_duplicate_batches_are_deduplicated() {
        // same (base, seed) => same batch id
        let g1 = graph(&[json!("a")], 1, base(0));
        let g2 = graph(&[json!("a")], 1, base(0));
        assert_eq!(g1.batch_id, g2.batch_id);

        let correlation = correlate_nodes_across_batches(&[g1.clone(), g2], "entity");
        assert_eq!(correlation.get("a").unwrap(), &[g1.batch_id]);
    }

    #[test]
    fn non_consecutive_repeats_are_kept() {
        let g1 = graph(&[json!("a")], 1, base(0));
        let g2 = graph(&[json!("a")], 2, base(10));
        let g3 = graph(&[json!("a")], 1, base(0));
        assert_eq!(g1.batch_id, g3.batch_id);

        let correlation =
            correlate_nodes_across_batches(&[g1.clone(), g2.clone(), g3], "entity");
        assert_eq!(
            correlation.get("a").unwrap(),
            &[g1.batch_id, g2.batch_id, g1.batch_id]
        );
    }

    #[test]
    fn missing_and_null_keys_skip_the_node() {
        let g = graph(&[json!("a"), json!(null)], 1, base(0));
        let correlation = correlate_nodes_across_batches(&[g], "entity");
        assert_eq!(correlation.len(), 1);
        let none = correlate_nodes_across_batches(
            &[graph(&[json!("a")], 1, base(0))],
            "no_such_field",
        );
        assert!(none.is_empty());
    }

    #[test]
    fn empty_input_yields_empty_mapping() {
        let correlation = correlate_nodes_across_batches(&[], "entity");
        assert!(correlation.is_empty());
    }

    #[test]
    fn numeric_and_string_keys_stay_distinct() {
        let g = graph(&[json!(1), json!("1")], 1, base(0));
        let correlation = correlate_nodes_across_batches(&[g], "entity");
        assert_eq!(correlation.len(), 2);
    }

    #[test]
    fn iteration_follows_first_seen_order() {
        let g1 = graph(&[json!("z"), json!("a")], 1, base(0));
        let g2 = graph(&[json!("m"), json!("z")], 2, base(10));
        let correlation = correlate_nodes_across_batches(&[g1, g2], "entity");
        let keys: Vec<&str> = correlation.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn serializes_as_a_map_in_first_seen_order() {
        let g1 = graph(&[json!("b"), json!("a")], 1, base(0));
        let correlation = correlate_nodes_across_batches(&[g1.clone()], "entity");
        let json = serde_json::to_string(&correlation).unwrap();
        let expected = format!(
            r#"{{"b":["{id}"],"a":["{id}"]}}"#,
            id = g1.batch_id
        );
        assert_eq!(json, expected);
    }
}
