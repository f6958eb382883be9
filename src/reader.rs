//! Current-configuration lookup.
//!
//! Wraps a targeted GET into a snapshot keyed by the resource's natural
//! key. The broker answers a GET-by-key with either the single object or
//! HTTP 400 + error code 6; the latter means the object legitimately does
//! not exist and is reported as an empty snapshot, not as a failure.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::client::SempClient;
use crate::error::{Error, Result};

/// Current state of one resource: a map from natural-key value to the
/// object's full attribute set, with zero or exactly one entry.
pub type Snapshot = BTreeMap<String, Map<String, Value>>;

/// Fetch the object at `segments` and key it by `natural_key`.
pub fn get_configuration(
    client: &SempClient,
    segments: &[String],
    natural_key: &str,
) -> Result<Snapshot> {
    snapshot_from_lookup(client.get(segments), natural_key)
}

/// Fold the outcome of a targeted GET into a snapshot.
///
/// The "object not found" rejection becomes an empty snapshot; every
/// other failure propagates unchanged.
pub fn snapshot_from_lookup(outcome: Result<Value>, natural_key: &str) -> Result<Snapshot> {
    match outcome {
        Ok(data) => build_snapshot(&data, natural_key),
        Err(err) if err.is_not_found() => Ok(Snapshot::new()),
        Err(err) => Err(err),
    }
}

/// Turn a single-object GET payload into a one-entry snapshot.
///
/// Fails loudly when the payload is not a single object (the caller used
/// a list endpoint by mistake) or when the natural key is absent from it
/// (the adapter named the wrong key field).
pub fn build_snapshot(data: &Value, natural_key: &str) -> Result<Snapshot> {
    let Value::Object(attributes) = data else {
        return Err(Error::AdapterContract(format!(
            "expected a single configuration object, got {}",
            type_name(data)
        )));
    };
    let Some(key_value) = attributes.get(natural_key) else {
        return Err(Error::AdapterContract(format!(
            "natural key '{natural_key}' missing from configuration object"
        )));
    };
    let key = match key_value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let mut snapshot = Snapshot::new();
    snapshot.insert(key, attributes.clone());
    Ok(snapshot)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_snapshot_single_object() {
        let data = json!({"aclProfileName": "test", "clientConnectDefaultAction": "allow"});
        let snapshot = build_snapshot(&data, "aclProfileName").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot["test"]["clientConnectDefaultAction"],
            json!("allow")
        );
    }

    #[test]
    fn test_build_snapshot_rejects_array() {
        let data = json!([{"aclProfileName": "test"}]);
        let err = build_snapshot(&data, "aclProfileName").unwrap_err();
        assert!(matches!(err, Error::AdapterContract(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_build_snapshot_rejects_missing_key() {
        let data = json!({"somethingElse": "test"});
        let err = build_snapshot(&data, "aclProfileName").unwrap_err();
        assert!(matches!(err, Error::AdapterContract(_)));
        assert!(err.to_string().contains("aclProfileName"));
    }

    #[test]
    fn test_not_found_rejection_becomes_empty_snapshot() {
        let outcome = Err(Error::rejected(json!({
            "responseCode": 400,
            "error": {"code": 6, "description": "NOT_FOUND"}
        })));
        let snapshot = snapshot_from_lookup(outcome, "queueName").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_other_rejection_propagates() {
        let outcome = Err(Error::rejected(json!({
            "responseCode": 400,
            "error": {"code": 11, "description": "INVALID_PARAMETER"}
        })));
        let err = snapshot_from_lookup(outcome, "queueName").unwrap_err();
        assert!(matches!(err, Error::BrokerRejected { .. }));
    }

    #[test]
    fn test_successful_lookup_becomes_one_entry_snapshot() {
        let outcome = Ok(json!({"queueName": "q1", "accessType": "exclusive"}));
        let snapshot = snapshot_from_lookup(outcome, "queueName").unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["q1"]["accessType"], json!("exclusive"));
    }
}
