// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA transport abstraction layer.
//!
//! [`UaTransport`] is the seam between the engine and the wire. Each method
//! is one protocol exchange and reports failures as a [`ServiceFault`]; the
//! engine components decide which error kind a fault becomes. The `opcua`
//! crate backend lives behind the `real-transport` feature, tests use
//! scripted implementations.

use std::fmt;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::certificate::SecurityMaterial;
use crate::error::ServiceFault;
use crate::types::{
    AttributeId, BrowseDirection, ExpandedNodeId, NodeClass, NodeId, SecurityMode,
    SecurityPolicy, StatusCode, TimestampsToReturn, TransportProtocol,
};

// =============================================================================
// Endpoint
// =============================================================================

/// Server-advertised connection descriptor. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Endpoint URL.
    pub url: String,

    /// Security policy URI.
    pub security_policy_uri: String,

    /// Message security mode.
    pub security_mode: SecurityMode,

    /// Transport profile URI.
    pub transport_profile_uri: String,

    /// Relative security level advertised by the server.
    #[serde(default)]
    pub security_level: u8,

    /// DER server certificate, if advertised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_certificate: Option<Vec<u8>>,
}

impl Endpoint {
    /// Creates an opc.tcp endpoint descriptor.
    pub fn new(url: impl Into<String>, policy: SecurityPolicy, mode: SecurityMode) -> Self {
        Self {
            url: url.into(),
            security_policy_uri: policy.uri().to_string(),
            security_mode: mode,
            transport_profile_uri: TransportProtocol::OpcTcp.profile_uri().to_string(),
            security_level: 0,
            server_certificate: None,
        }
    }

    /// Returns the security policy, if recognized.
    pub fn security_policy(&self) -> Option<SecurityPolicy> {
        SecurityPolicy::from_uri(&self.security_policy_uri)
    }

    /// Returns the transport protocol derived from the URL scheme.
    pub fn transport_protocol(&self) -> Option<TransportProtocol> {
        TransportProtocol::from_url(&self.url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = self
            .security_policy()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| self.security_policy_uri.clone());
        write!(f, "{} [{} / {}]", self.url, policy, self.security_mode)
    }
}

// =============================================================================
// ChannelId / ClientIdentity
// =============================================================================

/// Transport-assigned handle of a secure channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "channel-{}", self.0)
    }
}

/// Client application description sent to servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIdentity {
    /// Application display name.
    pub application_name: String,

    /// Application URI.
    pub application_uri: String,

    /// Product URI.
    pub product_uri: String,

    /// Preferred locales, most preferred first. Never empty.
    pub locales: Vec<String>,
}

impl ClientIdentity {
    /// Builds the identity for an application name.
    ///
    /// ```
    /// use uafetch_opcua::client::ClientIdentity;
    ///
    /// let identity = ClientIdentity::for_application("reader");
    /// assert_eq!(identity.product_uri, "urn:reader");
    /// assert_eq!(identity.locales, vec!["en".to_string()]);
    /// ```
    pub fn for_application(application_name: &str) -> Self {
        let uri = format!("urn:{}", application_name);
        Self {
            application_name: application_name.to_string(),
            application_uri: uri.clone(),
            product_uri: uri,
            locales: vec!["en".to_string()],
        }
    }
}

// =============================================================================
// Read types
// =============================================================================

/// Node plus attribute selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadValueId {
    /// Node to read.
    pub node_id: NodeId,
    /// Attribute to read.
    pub attribute_id: AttributeId,
}

impl ReadValueId {
    /// Selects the Value attribute of a node.
    pub fn value(node_id: NodeId) -> Self {
        Self {
            node_id,
            attribute_id: AttributeId::Value,
        }
    }
}

/// A read service request.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest {
    /// Maximum acceptable value age in milliseconds.
    pub max_age: f64,
    /// Timestamps requested from the server.
    pub timestamps_to_return: TimestampsToReturn,
    /// Read targets.
    pub nodes_to_read: Vec<ReadValueId>,
}

/// Max-age hint sent with every read, in milliseconds.
pub const DEFAULT_MAX_AGE: f64 = 500.0;

impl ReadRequest {
    /// Reads the Value attribute of each node, both timestamps, max age 500.
    pub fn for_values(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            timestamps_to_return: TimestampsToReturn::Both,
            nodes_to_read: nodes.into_iter().map(ReadValueId::value).collect(),
        }
    }

    /// Comma separated node IDs, for diagnostics.
    pub fn describe(&self) -> String {
        self.nodes_to_read
            .iter()
            .map(|r| r.node_id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A read result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataValue {
    /// Value payload.
    pub value: Variant,
    /// Status code (available, not interpreted).
    pub status: StatusCode,
    /// Source timestamp.
    pub source_timestamp: Option<DateTime<Utc>>,
    /// Server timestamp.
    pub server_timestamp: Option<DateTime<Utc>>,
}

impl DataValue {
    /// Creates a good data value with a server timestamp.
    pub fn new(value: impl Into<Variant>, server_timestamp: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            status: StatusCode::GOOD,
            source_timestamp: None,
            server_timestamp: Some(server_timestamp),
        }
    }
}

// =============================================================================
// Variant
// =============================================================================

/// Decoded value payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Variant {
    /// Boolean value.
    Boolean(bool),
    /// Signed byte.
    SByte(i8),
    /// Unsigned byte.
    Byte(u8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// String value.
    String(String),
    /// Date/time value.
    DateTime(DateTime<Utc>),
    /// GUID value.
    Guid(Uuid),
    /// Byte string.
    ByteString(Vec<u8>),
    /// Array of values.
    Array(Vec<Variant>),
    /// Empty value.
    #[default]
    Null,
}

impl Variant {
    /// Returns the type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::SByte(_) => "SByte",
            Self::Byte(_) => "Byte",
            Self::Int16(_) => "Int16",
            Self::UInt16(_) => "UInt16",
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::Int64(_) => "Int64",
            Self::UInt64(_) => "UInt64",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::DateTime(_) => "DateTime",
            Self::Guid(_) => "Guid",
            Self::ByteString(_) => "ByteString",
            Self::Array(_) => "Array",
            Self::Null => "Null",
        }
    }

    /// Returns `true` for the empty value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::SByte(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Guid(v) => write!(f, "{}", v),
            Self::ByteString(v) => write!(f, "{}", BASE64.encode(v)),
            Self::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, "|")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Null => write!(f, "null"),
        }
    }
}

macro_rules! impl_variant_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_variant_from! {
    bool => Boolean,
    i8 => SByte,
    u8 => Byte,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Float,
    f64 => Double,
    String => String,
    DateTime<Utc> => DateTime,
    Uuid => Guid,
    Vec<u8> => ByteString,
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

// =============================================================================
// Browse types
// =============================================================================

/// A single-node browse request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseDescription {
    /// Node whose references are listed.
    pub node_id: NodeId,
    /// Reference direction.
    pub browse_direction: BrowseDirection,
    /// Reference type to follow.
    pub reference_type_id: NodeId,
    /// Include subtypes of the reference type.
    pub include_subtypes: bool,
    /// Node class filter (0 = all classes).
    pub node_class_mask: u32,
}

impl BrowseDescription {
    /// Forward hierarchical references of `node_id`, all node classes.
    pub fn forward(node_id: NodeId) -> Self {
        Self {
            node_id,
            browse_direction: BrowseDirection::Forward,
            // HierarchicalReferences
            reference_type_id: NodeId::numeric(0, 33),
            include_subtypes: true,
            node_class_mask: 0,
        }
    }
}

/// One reference returned by a browse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceDescription {
    /// Target node.
    pub node_id: ExpandedNodeId,
    /// Browse name of the target.
    pub browse_name: String,
    /// Display name of the target.
    pub display_name: String,
    /// Node class of the target.
    pub node_class: NodeClass,
    /// Reference type.
    pub reference_type_id: NodeId,
    /// Direction of the reference.
    pub is_forward: bool,
}

impl ReferenceDescription {
    /// Creates an Organizes-style forward reference to a node.
    pub fn to_node(node_id: impl Into<ExpandedNodeId>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            node_id: node_id.into(),
            browse_name: name.clone(),
            display_name: name,
            node_class: NodeClass::Object,
            // Organizes
            reference_type_id: NodeId::numeric(0, 35),
            is_forward: true,
        }
    }
}

// =============================================================================
// UaTransport
// =============================================================================

/// Protocol exchanges the engine performs.
///
/// Every method is one blocking exchange from the caller's point of view;
/// the engine wraps each call in a timeout. Implementations must be
/// `Send + Sync` so one transport can serve several invocations.
#[async_trait]
pub trait UaTransport: Send + Sync {
    /// Fetches the endpoints a server advertises at `url`.
    async fn discover_endpoints(
        &self,
        url: &str,
        identity: &ClientIdentity,
    ) -> Result<Vec<Endpoint>, ServiceFault>;

    /// Opens a secure channel and creates (not yet activates) a session.
    async fn create_channel(
        &self,
        endpoint: &Endpoint,
        material: &SecurityMaterial,
        identity: &ClientIdentity,
    ) -> Result<ChannelId, ServiceFault>;

    /// Activates the session created on `channel`.
    async fn activate_session(&self, channel: ChannelId) -> Result<(), ServiceFault>;

    /// Executes a read.
    async fn read(
        &self,
        channel: ChannelId,
        request: &ReadRequest,
    ) -> Result<Vec<DataValue>, ServiceFault>;

    /// Lists the references of one node.
    async fn browse(
        &self,
        channel: ChannelId,
        description: &BrowseDescription,
    ) -> Result<Vec<ReferenceDescription>, ServiceFault>;

    /// Closes the session and its channel.
    async fn close_channel(&self, channel: ChannelId) -> Result<(), ServiceFault>;

    /// Human readable transport name.
    fn display_name(&self) -> String;
}

// =============================================================================
// Tests
// =============================================================================
