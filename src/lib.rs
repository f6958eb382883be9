//! # sempctl
//!
//! Declarative configuration management for message brokers exposing a
//! SEMP v2 administrative REST interface.
//!
//! Each managed object (ACL profile, bridge, queue, trusted certificate
//! name, ...) supports desired-state reconciliation: given a target state
//! (`present`/`absent`) and desired field values, the engine reads the
//! broker's current configuration and issues the minimal corrective
//! request, or none at all.
//!
//! ## Core pieces
//!
//! - [`path`]: SEMP resource path composition with `%2F` encoding
//! - [`client`]: HTTP transport and response-envelope translation
//! - [`reader`]: GET-by-key into a natural-key-indexed snapshot
//! - [`normalize`]: string-to-number coercion of templated settings
//! - [`engine`]: the idempotent create/update/delete decision procedure
//! - [`resource`]: data-driven adapters, one spec per broker object type
//!
//! ## Example
//!
//! ```ignore
//! use sempctl::config::BrokerConfig;
//! use sempctl::client::SempClient;
//! use sempctl::engine::{reconcile, EnsureRequest, TargetState};
//! use sempctl::resource::{registry, GenericAdapter, Identity};
//!
//! let config = BrokerConfig::new("localhost", 8080, false, "admin", "admin", 1.0, "");
//! let client = SempClient::new(&config);
//! let spec = registry::find("acl-profile").unwrap();
//! let adapter = GenericAdapter::new(spec);
//!
//! let mut identity = Identity::new();
//! identity.insert("msg_vpn".into(), "default".into());
//!
//! let result = reconcile(&client, &adapter, &EnsureRequest {
//!     lookup: "my-profile",
//!     identity: &identity,
//!     settings: None,
//!     state: TargetState::Present,
//!     dry_run: false,
//! })?;
//! assert!(result.changed);
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod path;
pub mod reader;
pub mod resource;

pub use client::SempClient;
pub use config::BrokerConfig;
pub use engine::{EnsureRequest, ReconcileResult, TargetState, reconcile};
pub use error::{Error, Result};
pub use resource::{GenericAdapter, Identity, ResourceAdapter, ResourceSpec};
