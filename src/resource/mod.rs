//! Resource adapters: the seam between the reconciliation engine and the
//! broker's per-object-type REST endpoints.
//!
//! The dozens of broker object types differ only in their path template,
//! natural-key field name, and the fields merged into a create payload, so
//! they are modeled as data ([`ResourceSpec`]) consumed by one generic
//! adapter rather than as a type per object.

pub mod registry;

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::client::SempClient;
use crate::error::{Error, Result};
use crate::path;
use crate::reader::{self, Snapshot};

/// Identity parameters for one invocation, keyed by parameter name
/// (e.g. `msg_vpn`, `virtual_router`).
pub type Identity = BTreeMap<String, String>;

/// Operations the reconciliation engine requires of every resource type.
pub trait ResourceAdapter {
    /// The broker field that uniquely identifies an instance within its
    /// collection, e.g. `aclProfileName`.
    fn natural_key(&self) -> &str;

    /// Whether the broker supports PATCH for this resource. Exception
    /// and trusted-name objects are create/delete only.
    fn supports_update(&self) -> bool {
        true
    }

    /// Fetch the current configuration keyed by the natural key.
    fn get(&self, client: &SempClient, identity: &Identity, lookup: &str) -> Result<Snapshot>;

    /// Create the object, merging `settings` over the mandatory fields.
    fn create(
        &self,
        client: &SempClient,
        identity: &Identity,
        lookup: &str,
        settings: Option<&Map<String, Value>>,
    ) -> Result<Value>;

    /// Patch the object with `delta` (the changed fields only).
    fn update(
        &self,
        client: &SempClient,
        identity: &Identity,
        lookup: &str,
        delta: &Map<String, Value>,
    ) -> Result<Value>;

    /// Delete the object.
    fn delete(&self, client: &SempClient, identity: &Identity, lookup: &str) -> Result<Value>;
}

/// One element of a collection path template.
#[derive(Debug, Clone, Copy)]
pub enum Segment {
    /// A fixed collection name, e.g. `msgVpns`.
    Literal(&'static str),
    /// The value of an identity parameter, e.g. the parent VPN name.
    Param(&'static str),
    /// Identity parameters joined with commas into one path element,
    /// e.g. `{bridge_name},{virtual_router}`.
    Composite(&'static [&'static str]),
}

/// One part of a composite instance key.
#[derive(Debug, Clone, Copy)]
pub enum KeyPart {
    /// An identity parameter value.
    Param(&'static str),
    /// The lookup value (the natural key).
    Lookup,
}

/// How the instance path element is formed from the lookup value.
#[derive(Debug, Clone, Copy)]
pub enum InstanceKey {
    /// The lookup value alone.
    Lookup,
    /// An ordered, comma-joined composite, e.g. `{topic_syntax},{topic}`
    /// or `{bridge_name},{virtual_router}`.
    Composite(&'static [KeyPart]),
}

/// Source of a field merged into every create payload.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource {
    /// An identity parameter value.
    Param(&'static str),
    /// The lookup value (the natural key).
    Lookup,
    /// A fixed default.
    Literal(&'static str),
}

/// Declarative description of one broker object type.
#[derive(Debug, Clone, Copy)]
pub struct ResourceSpec {
    /// CLI-facing name, e.g. `acl-profile`.
    pub name: &'static str,
    /// Natural-key field name in the broker's API.
    pub natural_key: &'static str,
    /// Identity parameters the path template requires, in call order.
    pub identity_params: &'static [&'static str],
    /// Path of the collection, below the API root.
    pub collection: &'static [Segment],
    /// How the instance path element is built.
    pub instance: InstanceKey,
    /// Broker fields merged into every create payload before desired
    /// settings are overlaid (settings win on conflict).
    pub create_fields: &'static [(&'static str, FieldSource)],
    /// Whether PATCH is supported.
    pub patchable: bool,
}

impl ResourceSpec {
    fn param<'a>(&self, identity: &'a Identity, name: &str) -> Result<&'a str> {
        identity
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingIdentity {
                resource: self.name.to_string(),
                param: name.to_string(),
            })
    }

    /// Path segments of the collection, starting at the API root.
    pub fn collection_path(&self, identity: &Identity) -> Result<Vec<String>> {
        let mut segments = path::root();
        for segment in self.collection.iter().copied() {
            match segment {
                Segment::Literal(name) => segments.push(name.to_string()),
                Segment::Param(name) => segments.push(self.param(identity, name)?.to_string()),
                Segment::Composite(names) => {
                    let parts: Vec<&str> = names
                        .iter()
                        .copied()
                        .map(|name| self.param(identity, name))
                        .collect::<Result<_>>()?;
                    segments.push(parts.join(","));
                }
            }
        }
        Ok(segments)
    }

    /// Path segments addressing one instance.
    pub fn instance_path(&self, identity: &Identity, lookup: &str) -> Result<Vec<String>> {
        let mut segments = self.collection_path(identity)?;
        match self.instance {
            InstanceKey::Lookup => segments.push(lookup.to_string()),
            InstanceKey::Composite(parts) => {
                let resolved: Vec<&str> = parts
                    .iter()
                    .copied()
                    .map(|part| match part {
                        KeyPart::Param(name) => self.param(identity, name),
                        KeyPart::Lookup => Ok(lookup),
                    })
                    .collect::<Result<_>>()?;
                segments.push(resolved.join(","));
            }
        }
        Ok(segments)
    }

    /// Build a create payload: spec-declared fields first, then the
    /// desired settings overlaid (settings win on conflict).
    pub fn create_payload(
        &self,
        identity: &Identity,
        lookup: &str,
        settings: Option<&Map<String, Value>>,
    ) -> Result<Map<String, Value>> {
        let mut payload = Map::new();
        for (field, source) in self.create_fields.iter().copied() {
            let value = match source {
                FieldSource::Param(name) => self.param(identity, name)?.to_string(),
                FieldSource::Lookup => lookup.to_string(),
                FieldSource::Literal(default) => default.to_string(),
            };
            payload.insert(field.to_string(), Value::String(value));
        }
        if let Some(settings) = settings {
            for (key, value) in settings {
                payload.insert(key.clone(), value.clone());
            }
        }
        Ok(payload)
    }
}

/// The one adapter implementation: interprets a [`ResourceSpec`].
pub struct GenericAdapter {
    spec: &'static ResourceSpec,
}

impl GenericAdapter {
    pub fn new(spec: &'static ResourceSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &'static ResourceSpec {
        self.spec
    }
}

impl ResourceAdapter for GenericAdapter {
    fn natural_key(&self) -> &str {
        self.spec.natural_key
    }

    fn supports_update(&self) -> bool {
        self.spec.patchable
    }

    fn get(&self, client: &SempClient, identity: &Identity, lookup: &str) -> Result<Snapshot> {
        let segments = self.spec.instance_path(identity, lookup)?;
        reader::get_configuration(client, &segments, self.spec.natural_key)
    }

    fn create(
        &self,
        client: &SempClient,
        identity: &Identity,
        lookup: &str,
        settings: Option<&Map<String, Value>>,
    ) -> Result<Value> {
        let segments = self.spec.collection_path(identity)?;
        let payload = self.spec.create_payload(identity, lookup, settings)?;
        client.post(&segments, &Value::Object(payload))
    }

    fn update(
        &self,
        client: &SempClient,
        identity: &Identity,
        lookup: &str,
        delta: &Map<String, Value>,
    ) -> Result<Value> {
        let segments = self.spec.instance_path(identity, lookup)?;
        client.patch(&segments, &Value::Object(delta.clone()))
    }

    fn delete(&self, client: &SempClient, identity: &Identity, lookup: &str) -> Result<Value> {
        let segments = self.spec.instance_path(identity, lookup)?;
        client.delete(&segments)
    }
}
