//! Error types for broker reconciliation.
//!
//! Every failure is terminal for the invocation that produced it: the core
//! performs no internal retries, and surfaces enough structure (the broker's
//! error code and description where available) for the caller to decide on
//! its own retry policy.

use serde_json::Value;

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling broker configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure: unreachable host, refused connection,
    /// DNS, timeout. Payload is the stringified transport error.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The broker answered with a non-200 status that is not the
    /// "object not found" signature. Carries the response `meta` object
    /// verbatim so the broker's error code and description are preserved.
    #[error("broker rejected request: {}", format_meta(.meta))]
    BrokerRejected {
        /// The `meta` object of the broker's response envelope, or the
        /// literal string `"Unknown error"` when the body had no
        /// `error.description`.
        meta: Value,
    },

    /// Desired settings contain keys the broker's GET did not echo back
    /// and that are not on the write-only whitelist.
    #[error("invalid key(s): {}", .0.join(", "))]
    UnknownSettingsKeys(Vec<String>),

    /// A resource adapter violated its contract: the GET payload was not
    /// a single object, or the natural key was missing from it. This is a
    /// programmer error in the adapter, not a broker condition.
    #[error("adapter contract violation: {0}")]
    AdapterContract(String),

    /// No resource spec registered under the given name.
    #[error("unknown resource type: {0}")]
    UnknownResource(String),

    /// An identity parameter required by the resource's path template was
    /// not supplied.
    #[error("resource '{resource}' requires parameter '{param}'")]
    MissingIdentity {
        /// Resource type name.
        resource: String,
        /// Missing parameter name.
        param: String,
    },

    /// The desired settings could not be parsed as a JSON object.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl Error {
    /// Build a `BrokerRejected` from a response `meta` payload.
    pub fn rejected(meta: Value) -> Self {
        Self::BrokerRejected { meta }
    }

    /// Whether this error is the broker's canonical "object not found"
    /// signature: HTTP 400 with `error.code == 6` in the `meta` object.
    /// A targeted GET hitting this condition means "the queried item
    /// legitimately does not exist", not "the request failed".
    pub fn is_not_found(&self) -> bool {
        let Self::BrokerRejected { meta } = self else {
            return false;
        };
        meta.get("responseCode").and_then(Value::as_u64) == Some(400)
            && meta.pointer("/error/code").and_then(Value::as_u64) == Some(6)
    }
}

fn format_meta(meta: &Value) -> String {
    match meta {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Self::Connection(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_found_signature() {
        let err = Error::rejected(json!({
            "responseCode": 400,
            "error": { "code": 6, "description": "NOT_FOUND" }
        }));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_other_code_is_not_not_found() {
        let err = Error::rejected(json!({
            "responseCode": 400,
            "error": { "code": 11, "description": "INVALID_PARAMETER" }
        }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_non_400_is_not_not_found() {
        let err = Error::rejected(json!({
            "responseCode": 500,
            "error": { "code": 6, "description": "NOT_FOUND" }
        }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_string_meta_is_not_not_found() {
        let err = Error::rejected(json!("Unknown error"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_unknown_keys_message_lists_all() {
        let err = Error::UnknownSettingsKeys(vec!["bogus".into(), "worse".into()]);
        let msg = err.to_string();
        assert!(msg.contains("bogus"));
        assert!(msg.contains("worse"));
    }

    #[test]
    fn test_rejected_display_keeps_description() {
        let err = Error::rejected(json!({
            "error": { "code": 11, "description": "INVALID_PARAMETER" }
        }));
        assert!(err.to_string().contains("INVALID_PARAMETER"));
    }
}
