//! Broker connection configuration.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Connection descriptor for one broker management endpoint.
///
/// Built once per invocation from caller-supplied parameters and never
/// mutated afterwards; each reconciliation owns its own copy.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Scheme + host + port, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Administrator username for HTTP basic auth.
    pub username: String,
    /// Administrator password for HTTP basic auth.
    pub password: String,
    /// Request timeout in seconds.
    pub timeout: f64,
    /// Value of the `x-broker-name` header, used when requests go through
    /// a management proxy that routes on broker name. Empty by default.
    pub x_broker: String,
}

impl BrokerConfig {
    /// Build a config from the individual connection fields.
    pub fn new(
        host: &str,
        port: u16,
        secure: bool,
        username: &str,
        password: &str,
        timeout: f64,
        x_broker: &str,
    ) -> Self {
        let scheme = if secure { "https" } else { "http" };
        Self {
            base_url: format!("{scheme}://{host}:{port}"),
            username: username.to_string(),
            password: password.to_string(),
            timeout,
            x_broker: x_broker.to_string(),
        }
    }
}

/// Parse repeated `key=value` arguments into an ordered map.
///
/// Used for identity parameters (`--param msg_vpn=default`) and for list
/// query parameters. Later duplicates win.
pub fn parse_key_values(pairs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::InvalidSettings(format!(
                "expected key=value, got '{pair}'"
            )));
        };
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}
