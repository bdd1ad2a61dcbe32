//! Provider/peer discovery record interpretation.
//!
//! `dht/findprovs` streams NDJSON records of two shapes:
//!
//! - a **leaf** record with a non-empty `ID` field, naming one provider;
//! - a **wrapper** record whose `ID` is empty and whose `Responses` array
//!   carries the actual sub-records.
//!
//! Leaf records are emitted directly; wrappers are flattened by emitting
//! each non-empty-`ID` sub-record in array order at the wrapper's
//! position, so overall order is stream-arrival order. Consumption stops
//! as soon as the caller's result limit is reached and the remaining
//! stream is released, not drained.

use crate::client::stream::EventStream;
use crate::error::Result;
use crate::types::ProviderRecord;
use serde_json::Value;

/// Collect up to `limit` provider records from an open event stream.
///
/// The stream is released as soon as the limit is reached or it ends.
pub async fn collect_providers(
    mut events: EventStream,
    limit: usize,
) -> Result<Vec<ProviderRecord>> {
    let mut found = Vec::with_capacity(limit.min(64));
    if limit == 0 {
        return Ok(found);
    }

    while let Some(item) = events.next().await {
        let event = item?;
        for record in flatten_record(&event.value) {
            tracing::debug!(provider = %record.id, "provider found");
            found.push(record);
            if found.len() >= limit {
                events.cancel();
                return Ok(found);
            }
        }
    }

    Ok(found)
}

/// Flatten one NDJSON record into zero or more provider records.
///
/// Records that do not deserialize (for example an `Addrs` field of the
/// wrong JSON type) are dropped rather than emitted empty, so they never
/// count against the caller's limit.
fn flatten_record(value: &Value) -> Vec<ProviderRecord> {
    let id = value.get("ID").and_then(Value::as_str).unwrap_or_default();
    if !id.is_empty() {
        return to_record(value).into_iter().collect();
    }

    let Some(responses) = value.get("Responses").and_then(Value::as_array) else {
        return Vec::new();
    };
    responses
        .iter()
        .filter(|r| {
            r.get("ID")
                .and_then(Value::as_str)
                .is_some_and(|id| !id.is_empty())
        })
        .filter_map(to_record)
        .collect()
}

fn to_record(value: &Value) -> Option<ProviderRecord> {
    match serde_json::from_value(value.clone()) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(error = %e, "dropping malformed provider record");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn leaf_record_is_emitted_directly() {
        let records = flatten_record(&json!({"ID": "QmA", "Addrs": ["/ip4/1.2.3.4/tcp/4001"]}));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "QmA");
        assert_eq!(records[0].addresses, vec!["/ip4/1.2.3.4/tcp/4001"]);
    }

    #[test]
    fn wrapper_flattens_responses_in_order() {
        let records = flatten_record(&json!({
            "ID": "",
            "Responses": [{"ID": "QmA"}, {"ID": ""}, {"ID": "QmB"}]
        }));
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["QmA", "QmB"]);
    }

    #[test]
    fn wrapper_without_responses_emits_nothing() {
        assert!(flatten_record(&json!({"ID": "", "Extra": 7})).is_empty());
        assert!(flatten_record(&json!({"Type": 4})).is_empty());
    }

    #[test]
    fn malformed_leaf_record_is_dropped() {
        // Addrs of the wrong JSON type must not surface as an empty record.
        assert!(flatten_record(&json!({"ID": "QmA", "Addrs": 5})).is_empty());
    }

    #[test]
    fn malformed_sub_record_does_not_suppress_siblings() {
        let records = flatten_record(&json!({
            "ID": "",
            "Responses": [{"ID": "QmA", "Addrs": "bad"}, {"ID": "QmB"}]
        }));
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["QmB"]);
    }
}
