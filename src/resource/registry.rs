//! Registry of broker object types.
//!
//! Each entry maps a CLI resource name to its SEMP v2 path template,
//! natural key, and create-payload fields. Objects the broker exposes
//! without PATCH support (topic exceptions, trusted common names,
//! subscriptions) are marked non-patchable.

use super::{FieldSource, InstanceKey, KeyPart, ResourceSpec, Segment};

use FieldSource::{Literal as Fixed, Lookup, Param as FromParam};
use Segment::{Composite, Literal, Param};

/// All registered resource types.
pub static SPECS: &[ResourceSpec] = &[
    ResourceSpec {
        name: "acl-profile",
        natural_key: "aclProfileName",
        identity_params: &["msg_vpn"],
        collection: &[Literal("msgVpns"), Param("msg_vpn"), Literal("aclProfiles")],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("aclProfileName", Lookup),
        ],
        patchable: true,
    },
    ResourceSpec {
        name: "acl-publish-exception",
        natural_key: "publishExceptionTopic",
        identity_params: &["msg_vpn", "acl_profile_name", "topic_syntax"],
        collection: &[
            Literal("msgVpns"),
            Param("msg_vpn"),
            Literal("aclProfiles"),
            Param("acl_profile_name"),
            Literal("publishExceptions"),
        ],
        instance: InstanceKey::Composite(&[KeyPart::Param("topic_syntax"), KeyPart::Lookup]),
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("aclProfileName", FromParam("acl_profile_name")),
            ("topicSyntax", FromParam("topic_syntax")),
            ("publishExceptionTopic", Lookup),
        ],
        patchable: false,
    },
    ResourceSpec {
        name: "client-profile",
        natural_key: "clientProfileName",
        identity_params: &["msg_vpn"],
        collection: &[
            Literal("msgVpns"),
            Param("msg_vpn"),
            Literal("clientProfiles"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("clientProfileName", Lookup),
        ],
        patchable: true,
    },
    ResourceSpec {
        name: "client-username",
        natural_key: "clientUsername",
        identity_params: &["msg_vpn"],
        collection: &[
            Literal("msgVpns"),
            Param("msg_vpn"),
            Literal("clientUsernames"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("clientUsername", Lookup),
        ],
        patchable: true,
    },
    ResourceSpec {
        name: "queue",
        natural_key: "queueName",
        identity_params: &["msg_vpn"],
        collection: &[Literal("msgVpns"), Param("msg_vpn"), Literal("queues")],
        instance: InstanceKey::Lookup,
        create_fields: &[("msgVpnName", FromParam("msg_vpn")), ("queueName", Lookup)],
        patchable: true,
    },
    ResourceSpec {
        name: "queue-subscription",
        natural_key: "subscriptionTopic",
        identity_params: &["msg_vpn", "queue_name"],
        collection: &[
            Literal("msgVpns"),
            Param("msg_vpn"),
            Literal("queues"),
            Param("queue_name"),
            Literal("subscriptions"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("queueName", FromParam("queue_name")),
            ("subscriptionTopic", Lookup),
        ],
        patchable: false,
    },
    ResourceSpec {
        name: "mqtt-session-subscription",
        natural_key: "subscriptionTopic",
        identity_params: &["msg_vpn", "mqtt_session_client_id", "virtual_router"],
        collection: &[
            Literal("msgVpns"),
            Param("msg_vpn"),
            Literal("mqttSessions"),
            Composite(&["mqtt_session_client_id", "virtual_router"]),
            Literal("subscriptions"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("mqttSessionClientId", FromParam("mqtt_session_client_id")),
            ("mqttSessionVirtualRouter", FromParam("virtual_router")),
            ("subscriptionTopic", Lookup),
        ],
        patchable: false,
    },
    ResourceSpec {
        name: "topic-endpoint",
        natural_key: "topicEndpointName",
        identity_params: &["msg_vpn"],
        collection: &[
            Literal("msgVpns"),
            Param("msg_vpn"),
            Literal("topicEndpoints"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("topicEndpointName", Lookup),
        ],
        patchable: true,
    },
    ResourceSpec {
        name: "bridge",
        natural_key: "bridgeName",
        identity_params: &["msg_vpn", "virtual_router"],
        collection: &[Literal("msgVpns"), Param("msg_vpn"), Literal("bridges")],
        instance: InstanceKey::Composite(&[KeyPart::Lookup, KeyPart::Param("virtual_router")]),
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("bridgeVirtualRouter", FromParam("virtual_router")),
            ("bridgeName", Lookup),
        ],
        patchable: true,
    },
    ResourceSpec {
        name: "bridge-tls-cn",
        natural_key: "tlsTrustedCommonName",
        identity_params: &["msg_vpn", "virtual_router", "bridge_name"],
        collection: &[
            Literal("msgVpns"),
            Param("msg_vpn"),
            Literal("bridges"),
            Composite(&["bridge_name", "virtual_router"]),
            Literal("tlsTrustedCommonNames"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("bridgeVirtualRouter", FromParam("virtual_router")),
            ("bridgeName", FromParam("bridge_name")),
            ("tlsTrustedCommonName", Lookup),
        ],
        patchable: false,
    },
    ResourceSpec {
        name: "dmr-bridge",
        natural_key: "remoteNodeName",
        identity_params: &["msg_vpn"],
        collection: &[Literal("msgVpns"), Param("msg_vpn"), Literal("dmrBridges")],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("msgVpnName", FromParam("msg_vpn")),
            ("remoteMsgVpnName", Fixed("default")),
            ("remoteNodeName", Lookup),
        ],
        patchable: true,
    },
    ResourceSpec {
        name: "dmr-cluster",
        natural_key: "dmrClusterName",
        identity_params: &[],
        collection: &[Literal("dmrClusters")],
        instance: InstanceKey::Lookup,
        create_fields: &[("dmrClusterName", Lookup)],
        patchable: true,
    },
    ResourceSpec {
        name: "dmr-cluster-link",
        natural_key: "remoteNodeName",
        identity_params: &["dmr_cluster"],
        collection: &[
            Literal("dmrClusters"),
            Param("dmr_cluster"),
            Literal("links"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("dmrClusterName", FromParam("dmr_cluster")),
            ("remoteNodeName", Lookup),
        ],
        patchable: true,
    },
    ResourceSpec {
        name: "link-trusted-cn",
        natural_key: "tlsTrustedCommonName",
        identity_params: &["dmr_cluster", "remote_node_name"],
        collection: &[
            Literal("dmrClusters"),
            Param("dmr_cluster"),
            Literal("links"),
            Param("remote_node_name"),
            Literal("tlsTrustedCommonNames"),
        ],
        instance: InstanceKey::Lookup,
        create_fields: &[
            ("dmrClusterName", FromParam("dmr_cluster")),
            ("remoteNodeName", FromParam("remote_node_name")),
            ("tlsTrustedCommonName", Lookup),
        ],
        patchable: false,
    },
    ResourceSpec {
        name: "cert-authority",
        natural_key: "certAuthorityName",
        identity_params: &[],
        collection: &[Literal("certAuthorities")],
        instance: InstanceKey::Lookup,
        create_fields: &[("certAuthorityName", Lookup)],
        patchable: true,
    },
];

/// Look up a resource spec by CLI name.
pub fn find(name: &str) -> Option<&'static ResourceSpec> {
    SPECS.iter().find(|spec| spec.name == name)
}
