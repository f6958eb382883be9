//! The reconciliation engine.
//!
//! Given a target state and desired settings for one resource instance,
//! reads the current configuration, decides no-op / create / update /
//! delete, and executes the minimal corrective operation through the
//! resource adapter. Every mutating branch is wrapped by the dry-run
//! gate: the decision and `changed` flag are still computed, but no
//! HTTP call is made.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::client::SempClient;
use crate::error::{Error, Result};
use crate::normalize;
use crate::resource::{Identity, ResourceAdapter};

/// Configuration keys the broker accepts on write but never echoes back
/// on GET. They are exempt from the unknown-key check and always count
/// as changed, since their current value can never be observed.
const WRITE_ONLY_KEYS: &[&str] = &["password"];

/// Desired end state for a resource instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Present,
    Absent,
}

impl FromStr for TargetState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!("expected 'present' or 'absent', got '{other}'")),
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Present => "present",
            Self::Absent => "absent",
        })
    }
}

/// One reconciliation invocation.
#[derive(Debug)]
pub struct EnsureRequest<'a> {
    /// Natural-key value of the target instance.
    pub lookup: &'a str,
    /// Identity parameters (parent VPN name, virtual router, ...).
    pub identity: &'a Identity,
    /// Desired field values, if any.
    pub settings: Option<Map<String, Value>>,
    /// Target state.
    pub state: TargetState,
    /// Compute the decision but skip every mutating call.
    pub dry_run: bool,
}

/// Outcome of a reconciliation.
#[derive(Debug, Serialize)]
pub struct ReconcileResult {
    /// Whether a corrective operation was (or, under dry-run, would be)
    /// issued.
    pub changed: bool,
    /// The broker's response payload, or the current configuration for
    /// a no-op on an existing object.
    pub response: Value,
    /// Present only when an update occurred: exactly the changed keys
    /// and their new values.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<Map<String, Value>>,
}

impl ReconcileResult {
    fn unchanged(response: Value) -> Self {
        Self {
            changed: false,
            response,
            delta: None,
        }
    }
}

/// Reconcile one resource instance to its target state.
///
/// The initial read is fatal on any transport or broker failure; a
/// failure during create/update/delete is likewise fatal, and `changed`
/// is never reported for a mutation that did not succeed.
pub fn reconcile(
    client: &SempClient,
    adapter: &dyn ResourceAdapter,
    request: &EnsureRequest<'_>,
) -> Result<ReconcileResult> {
    let settings = request.settings.as_ref().map(|s| {
        // Templating renders every scalar as a string; coerce numerics
        // back before diffing against the broker's typed attributes.
        let mut normalized = s.clone();
        normalize::normalize(&mut normalized);
        normalized
    });

    let snapshot = adapter.get(client, request.identity, request.lookup)?;
    let current = snapshot.get(request.lookup);

    match (request.state, current) {
        (TargetState::Absent, Some(_)) => {
            if !request.dry_run {
                adapter.delete(client, request.identity, request.lookup)?;
            }
            Ok(ReconcileResult {
                changed: true,
                response: Value::Object(Map::new()),
                delta: None,
            })
        }
        (TargetState::Absent, None) => Ok(ReconcileResult::unchanged(Value::Object(Map::new()))),
        (TargetState::Present, None) => {
            let mut response = Value::Object(Map::new());
            if !request.dry_run {
                response =
                    adapter.create(client, request.identity, request.lookup, settings.as_ref())?;
            }
            Ok(ReconcileResult {
                changed: true,
                response,
                delta: None,
            })
        }
        (TargetState::Present, Some(current)) => {
            let Some(settings) = settings.filter(|s| !s.is_empty()) else {
                return Ok(ReconcileResult::unchanged(Value::Object(current.clone())));
            };
            let delta = compute_delta(&settings, current)?;
            if delta.is_empty() {
                return Ok(ReconcileResult::unchanged(Value::Object(current.clone())));
            }
            if !adapter.supports_update() {
                return Err(Error::AdapterContract(format!(
                    "'{}' objects cannot be updated in place; remove and recreate",
                    adapter.natural_key()
                )));
            }
            let mut response = Value::Object(Map::new());
            if !request.dry_run {
                response = adapter.update(client, request.identity, request.lookup, &delta)?;
            }
            Ok(ReconcileResult {
                changed: true,
                response,
                delta: Some(delta),
            })
        }
    }
}

/// Compute the minimal update payload.
///
/// Rejects desired keys the current attribute set does not contain
/// (unless write-only); keeps keys whose value differs, plus every
/// write-only key present in the desired settings.
pub fn compute_delta(
    desired: &Map<String, Value>,
    current: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let bad_keys: Vec<String> = desired
        .keys()
        .filter(|key| !current.contains_key(*key) && !WRITE_ONLY_KEYS.contains(&key.as_str()))
        .cloned()
        .collect();
    if !bad_keys.is_empty() {
        return Err(Error::UnknownSettingsKeys(bad_keys));
    }

    let delta: Map<String, Value> = desired
        .iter()
        .filter(|(key, value)| {
            WRITE_ONLY_KEYS.contains(&key.as_str())
                || current.get(*key).is_some_and(|cur| !values_equal(cur, value))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Ok(delta)
}

/// Value equality with numeric tolerance across integer/float forms.
///
/// The broker may echo `1.0` for a field set to `1`; such pairs must
/// not count as a change, or every run would re-issue the same PATCH.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(i), Some(j)) => i == j,
            _ => x.as_f64().zip(y.as_f64()).is_some_and(|(p, q)| p == q),
        },
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, v)| y.get(k).is_some_and(|w| values_equal(v, w)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(v, w)| values_equal(v, w))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerConfig;
    use crate::reader::Snapshot;
    use serde_json::json;
    use std::cell::RefCell;

    fn test_client() -> SempClient {
        SempClient::new(&BrokerConfig::new(
            "localhost", 8080, false, "admin", "admin", 1.0, "",
        ))
    }

    /// In-memory adapter that records which operations were invoked.
    struct FakeAdapter {
        existing: Option<Map<String, Value>>,
        patchable: bool,
        calls: RefCell<Vec<&'static str>>,
    }

    impl FakeAdapter {
        fn with_existing(attributes: Value) -> Self {
            Self {
                existing: attributes.as_object().cloned(),
                patchable: true,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn empty() -> Self {
            Self {
                existing: None,
                patchable: true,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn mutations(&self) -> Vec<&'static str> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| **c != "get")
                .copied()
                .collect()
        }
    }

    impl ResourceAdapter for FakeAdapter {
        fn natural_key(&self) -> &str {
            "queueName"
        }

        fn supports_update(&self) -> bool {
            self.patchable
        }

        fn get(&self, _: &SempClient, _: &Identity, lookup: &str) -> Result<Snapshot> {
            self.calls.borrow_mut().push("get");
            let mut snapshot = Snapshot::new();
            if let Some(attributes) = &self.existing {
                snapshot.insert(lookup.to_string(), attributes.clone());
            }
            Ok(snapshot)
        }

        fn create(
            &self,
            _: &SempClient,
            _: &Identity,
            _: &str,
            _: Option<&Map<String, Value>>,
        ) -> Result<Value> {
            self.calls.borrow_mut().push("create");
            Ok(json!({"created": true}))
        }

        fn update(
            &self,
            _: &SempClient,
            _: &Identity,
            _: &str,
            _: &Map<String, Value>,
        ) -> Result<Value> {
            self.calls.borrow_mut().push("update");
            Ok(json!({"updated": true}))
        }

        fn delete(&self, _: &SempClient, _: &Identity, _: &str) -> Result<Value> {
            self.calls.borrow_mut().push("delete");
            Ok(json!({}))
        }
    }

    fn request<'a>(
        identity: &'a Identity,
        settings: Option<Value>,
        state: TargetState,
        dry_run: bool,
    ) -> EnsureRequest<'a> {
        EnsureRequest {
            lookup: "q1",
            identity,
            settings: settings.and_then(|v| v.as_object().cloned()),
            state,
            dry_run,
        }
    }

    #[test]
    fn test_absent_existing_deletes() {
        let identity = Identity::new();
        let adapter = FakeAdapter::with_existing(json!({"queueName": "q1"}));
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(&identity, None, TargetState::Absent, false),
        )
        .unwrap();
        assert!(result.changed);
        assert_eq!(adapter.mutations(), vec!["delete"]);
    }

    #[test]
    fn test_absent_missing_is_noop() {
        let identity = Identity::new();
        let adapter = FakeAdapter::empty();
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(&identity, None, TargetState::Absent, false),
        )
        .unwrap();
        assert!(!result.changed);
        assert!(adapter.mutations().is_empty());
    }

    #[test]
    fn test_present_missing_creates() {
        let identity = Identity::new();
        let adapter = FakeAdapter::empty();
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(
                &identity,
                Some(json!({"maxMsgSpoolUsage": "500"})),
                TargetState::Present,
                false,
            ),
        )
        .unwrap();
        assert!(result.changed);
        assert_eq!(result.response, json!({"created": true}));
        assert_eq!(adapter.mutations(), vec!["create"]);
    }

    #[test]
    fn test_present_existing_without_settings_is_noop() {
        let identity = Identity::new();
        let adapter = FakeAdapter::with_existing(json!({"queueName": "q1", "accessType": "exclusive"}));
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(&identity, None, TargetState::Present, false),
        )
        .unwrap();
        assert!(!result.changed);
        assert_eq!(result.response["accessType"], json!("exclusive"));
        assert!(adapter.mutations().is_empty());
    }

    #[test]
    fn test_present_existing_matching_settings_is_noop() {
        let identity = Identity::new();
        let adapter =
            FakeAdapter::with_existing(json!({"queueName": "q1", "maxMsgSpoolUsage": 500}));
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(
                &identity,
                // String form; the normalizer makes it comparable.
                Some(json!({"maxMsgSpoolUsage": "500"})),
                TargetState::Present,
                false,
            ),
        )
        .unwrap();
        assert!(!result.changed);
        assert!(adapter.mutations().is_empty());
    }

    #[test]
    fn test_present_existing_differing_settings_patches_delta() {
        let identity = Identity::new();
        let adapter = FakeAdapter::with_existing(
            json!({"queueName": "q1", "maxMsgSpoolUsage": 500, "accessType": "exclusive"}),
        );
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(
                &identity,
                Some(json!({"maxMsgSpoolUsage": "900", "accessType": "exclusive"})),
                TargetState::Present,
                false,
            ),
        )
        .unwrap();
        assert!(result.changed);
        assert_eq!(
            result.delta,
            json!({"maxMsgSpoolUsage": 900}).as_object().cloned()
        );
        assert_eq!(adapter.mutations(), vec!["update"]);
    }

    #[test]
    fn test_unknown_key_fails_whole_invocation() {
        let identity = Identity::new();
        let adapter = FakeAdapter::with_existing(json!({"queueName": "q1"}));
        let err = reconcile(
            &test_client(),
            &adapter,
            &request(
                &identity,
                Some(json!({"bogus": 1})),
                TargetState::Present,
                false,
            ),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownSettingsKeys(_)));
        assert!(err.to_string().contains("bogus"));
        assert!(adapter.mutations().is_empty());
    }

    #[test]
    fn test_write_only_key_always_counts_as_changed() {
        let identity = Identity::new();
        let adapter = FakeAdapter::with_existing(json!({"queueName": "q1"}));
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(
                &identity,
                Some(json!({"password": "x"})),
                TargetState::Present,
                false,
            ),
        )
        .unwrap();
        assert!(result.changed);
        assert_eq!(result.delta, json!({"password": "x"}).as_object().cloned());
    }

    #[test]
    fn test_dry_run_reports_changed_without_calls() {
        let identity = Identity::new();

        let adapter = FakeAdapter::empty();
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(&identity, None, TargetState::Present, true),
        )
        .unwrap();
        assert!(result.changed);
        assert!(adapter.mutations().is_empty());

        let adapter = FakeAdapter::with_existing(json!({"queueName": "q1"}));
        let result = reconcile(
            &test_client(),
            &adapter,
            &request(&identity, None, TargetState::Absent, true),
        )
        .unwrap();
        assert!(result.changed);
        assert!(adapter.mutations().is_empty());
    }

    #[test]
    fn test_non_patchable_resource_rejects_update() {
        let identity = Identity::new();
        let mut adapter = FakeAdapter::with_existing(json!({"queueName": "q1", "a": 1}));
        adapter.patchable = false;
        let err = reconcile(
            &test_client(),
            &adapter,
            &request(&identity, Some(json!({"a": 2})), TargetState::Present, false),
        )
        .unwrap_err();
        assert!(matches!(err, Error::AdapterContract(_)));
        assert!(adapter.mutations().is_empty());
    }

    #[test]
    fn test_compute_delta_with_write_only_key() {
        let desired = json!({"a": 1, "b": 3, "password": "x"});
        let current = json!({"a": 1, "b": 2});
        let delta = compute_delta(
            desired.as_object().unwrap(),
            current.as_object().unwrap(),
        )
        .unwrap();
        assert_eq!(Value::Object(delta), json!({"b": 3, "password": "x"}));
    }

    #[test]
    fn test_compute_delta_int_equals_float() {
        // The broker echoes float-typed numbers for some integer fields.
        let desired = json!({"a": 1, "b": 2});
        let current = json!({"a": 1.0, "b": 2});
        let delta = compute_delta(
            desired.as_object().unwrap(),
            current.as_object().unwrap(),
        )
        .unwrap();
        assert!(delta.is_empty(), "delta not empty: {delta:?}");
    }

    #[test]
    fn test_compute_delta_numeric_difference_still_detected() {
        let desired = json!({"a": 2});
        let current = json!({"a": 1.0});
        let delta = compute_delta(
            desired.as_object().unwrap(),
            current.as_object().unwrap(),
        )
        .unwrap();
        assert_eq!(Value::Object(delta), json!({"a": 2}));
    }

    #[test]
    fn test_compute_delta_nested_numeric_equality() {
        let desired = json!({"eventThresholds": {"setValue": 80}});
        let current = json!({"eventThresholds": {"setValue": 80.0}});
        let delta = compute_delta(
            desired.as_object().unwrap(),
            current.as_object().unwrap(),
        )
        .unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_compute_delta_empty_when_equal() {
        let desired = json!({"a": 1});
        let current = json!({"a": 1, "b": 2});
        let delta = compute_delta(
            desired.as_object().unwrap(),
            current.as_object().unwrap(),
        )
        .unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_result_serialization_omits_absent_delta() {
        let result = ReconcileResult::unchanged(json!({}));
        let rendered = serde_json::to_string(&result).unwrap();
        assert!(!rendered.contains("delta"));
    }
}
