//! HTTP transport for the SEMP v2 configuration API.
//!
//! One client per invocation; requests are serial, each opens its own
//! connection, and no retry is attempted on failure. The broker's
//! response envelope is `{ "data": ..., "meta": { "error"?: { "code",
//! "description" } } }`; success is HTTP 200 with `data`, everything
//! else surfaces the `meta` object verbatim.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use log::debug;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::BrokerConfig;
use crate::error::{Error, Result};
use crate::path;

/// Hardcoded maximum the broker accepts for a bulk list request.
const MAX_REQUEST_ITEMS: u32 = 1000;

/// HTTP methods used against the configuration API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// Client for one broker management endpoint.
pub struct SempClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
    x_broker: String,
}

impl SempClient {
    /// Build a client from a connection descriptor.
    pub fn new(config: &BrokerConfig) -> Self {
        let timeout = Duration::try_from_secs_f64(config.timeout)
            .unwrap_or(Duration::from_secs(1));
        // Non-200 statuses must not become transport errors: the broker
        // puts its diagnostics in the body of 4xx responses.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        let credentials = format!("{}:{}", config.username, config.password);
        Self {
            agent,
            base_url: config.base_url.clone(),
            authorization: format!("Basic {}", BASE64.encode(credentials)),
            x_broker: config.x_broker.clone(),
        }
    }

    /// GET the object at `segments` and return its `data` payload.
    pub fn get(&self, segments: &[String]) -> Result<Value> {
        self.send(Method::Get, segments, None, &BTreeMap::new())
    }

    /// POST `body` to the collection at `segments`.
    pub fn post(&self, segments: &[String], body: &Value) -> Result<Value> {
        self.send(Method::Post, segments, Some(body), &BTreeMap::new())
    }

    /// PATCH the object at `segments` with `body` (the delta only).
    pub fn patch(&self, segments: &[String], body: &Value) -> Result<Value> {
        self.send(Method::Patch, segments, Some(body), &BTreeMap::new())
    }

    /// DELETE the object at `segments`. No body is sent.
    pub fn delete(&self, segments: &[String]) -> Result<Value> {
        self.send(Method::Delete, segments, None, &BTreeMap::new())
    }

    /// Bulk-list a collection in a single request, asking for the
    /// broker's hardcoded maximum item count. `query` carries caller
    /// query parameters such as `select` or `where`. Returns the `data`
    /// array, or an empty list when the collection is empty.
    pub fn get_list(
        &self,
        segments: &[String],
        query: &BTreeMap<String, String>,
    ) -> Result<Vec<Value>> {
        let mut params = query.clone();
        params.insert("count".to_string(), MAX_REQUEST_ITEMS.to_string());
        let data = self.send(Method::Get, segments, None, &params)?;
        match data {
            Value::Array(items) => Ok(items),
            Value::Object(map) if map.is_empty() => Ok(Vec::new()),
            other => Err(Error::AdapterContract(format!(
                "list endpoint returned a non-array payload: {other}"
            ))),
        }
    }

    fn send(
        &self,
        method: Method,
        segments: &[String],
        body: Option<&Value>,
        query: &BTreeMap<String, String>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path::compose(segments));
        debug!(
            "request: {} {} body={}",
            method.as_str(),
            url,
            body.map_or_else(|| "null".to_string(), Value::to_string)
        );

        // Any failure past this point is connection-level (DNS, refused,
        // timeout); HTTP error statuses come back as normal responses.
        let mut response = match method {
            Method::Get | Method::Delete => {
                let mut request = if method == Method::Get {
                    self.agent.get(&url)
                } else {
                    self.agent.delete(&url)
                }
                .header("Authorization", &self.authorization)
                .header("x-broker-name", &self.x_broker);
                for (key, value) in query {
                    request = request.query(key, value);
                }
                request.call()?
            }
            Method::Post | Method::Patch => {
                let mut request = if method == Method::Post {
                    self.agent.post(&url)
                } else {
                    self.agent.patch(&url)
                }
                .header("Authorization", &self.authorization)
                .header("x-broker-name", &self.x_broker);
                for (key, value) in query {
                    request = request.query(key, value);
                }
                request.send_json(body.unwrap_or(&Value::Null))?
            }
        };

        let status = response.status().as_u16();
        let payload: Value = response
            .body_mut()
            .read_json()
            .unwrap_or(Value::Null);
        debug!("response: {status} body={payload}");

        parse_response(status, &payload)
    }
}

/// Classify a decoded response into success payload or broker error.
///
/// HTTP 200 yields the `data` field, or an empty object when absent.
/// Anything else yields the full `meta` object when it carries an
/// `error.description`, preserving the broker's error code next to the
/// message, else the literal `"Unknown error"`.
pub fn parse_response(status: u16, body: &Value) -> Result<Value> {
    if status == 200 {
        return Ok(body
            .get("data")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())));
    }
    let meta = if body.pointer("/meta/error/description").is_some() {
        body.get("meta").cloned().unwrap_or(Value::Null)
    } else {
        Value::String("Unknown error".to_string())
    };
    Err(Error::rejected(meta))
}
