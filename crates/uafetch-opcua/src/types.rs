// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA protocol types used across the engine.
//!
//! - **NodeId / ExpandedNodeId**: node addresses with parsing and canonical text form
//! - **SecurityPolicy / SecurityMode**: message security negotiated with an endpoint
//! - **TransportProtocol**: transport derived from an endpoint URL scheme
//! - **AttributeId, BrowseDirection, NodeClass, TimestampsToReturn**: service parameters
//! - **StatusCode**: OPC UA status codes with symbolic names
//!
//! # Examples
//!
//! ```
//! use uafetch_opcua::types::{NodeId, SecurityPolicy};
//!
//! let node: NodeId = "ns=2;s=Temperature".parse().unwrap();
//! assert_eq!(node, NodeId::string(2, "Temperature"));
//! assert_eq!(NodeId::root_folder().to_string(), "i=84");
//!
//! let policy: SecurityPolicy = "Basic256Rsa256".parse().unwrap();
//! assert!(policy.uri().ends_with("#Basic256Sha256"));
//! ```

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ConfigurationError, OpcUaError};

// =============================================================================
// NodeId
// =============================================================================

/// OPC UA Node Identifier.
///
/// A namespace index plus one of four identifier shapes.
///
/// # Examples
///
/// ```
/// use uafetch_opcua::types::NodeId;
///
/// let numeric = NodeId::numeric(2, 1001);
/// assert_eq!(numeric.to_string(), "ns=2;i=1001");
///
/// let parsed: NodeId = "ns=2;s=MyDevice.Temperature".parse().unwrap();
/// assert_eq!(parsed.as_string(), Some("MyDevice.Temperature"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    /// Namespace index (0 = OPC UA standard namespace).
    pub namespace_index: u16,

    /// The node identifier.
    pub identifier: NodeIdentifier,
}

impl NodeId {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a numeric node ID.
    #[inline]
    pub fn numeric(namespace_index: u16, value: u32) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Numeric(value),
        }
    }

    /// Creates a string node ID.
    #[inline]
    pub fn string(namespace_index: u16, value: impl Into<String>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::String(value.into()),
        }
    }

    /// Creates a GUID node ID.
    #[inline]
    pub fn guid(namespace_index: u16, value: Uuid) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Guid(value),
        }
    }

    /// Creates an opaque (byte string) node ID.
    #[inline]
    pub fn opaque(namespace_index: u16, value: Vec<u8>) -> Self {
        Self {
            namespace_index,
            identifier: NodeIdentifier::Opaque(value),
        }
    }

    // =========================================================================
    // Well-known nodes
    // =========================================================================

    /// The address space root (`i=84`). Default browse start.
    pub fn root_folder() -> Self {
        Self::numeric(0, 84)
    }

    /// The Objects folder (`i=85`).
    pub fn objects_folder() -> Self {
        Self::numeric(0, 85)
    }

    /// The Types folder (`i=86`).
    pub fn types_folder() -> Self {
        Self::numeric(0, 86)
    }

    /// The Views folder (`i=87`).
    pub fn views_folder() -> Self {
        Self::numeric(0, 87)
    }

    /// The Server object (`i=2253`).
    pub fn server() -> Self {
        Self::numeric(0, 2253)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the numeric value if this is a numeric node ID.
    pub fn as_numeric(&self) -> Option<u32> {
        match self.identifier {
            NodeIdentifier::Numeric(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string value if this is a string node ID.
    pub fn as_string(&self) -> Option<&str> {
        match &self.identifier {
            NodeIdentifier::String(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the identifier shape name.
    pub const fn identifier_type(&self) -> &'static str {
        match &self.identifier {
            NodeIdentifier::Numeric(_) => "Numeric",
            NodeIdentifier::String(_) => "String",
            NodeIdentifier::Guid(_) => "Guid",
            NodeIdentifier::Opaque(_) => "Opaque",
        }
    }

    /// Parses the `[ns=<n>;]<x>=<v>` form shared by NodeId and ExpandedNodeId.
    ///
    /// `original` is used for error messages only.
    fn parse_with_context(s: &str, original: &str) -> Result<Self, OpcUaError> {
        let invalid = |reason: String| {
            OpcUaError::configuration(ConfigurationError::invalid_node_id(original, reason))
        };

        let (namespace_index, identifier_part) = match s.strip_prefix("ns=") {
            Some(rest) => {
                let (ns_str, id) = rest
                    .split_once(';')
                    .ok_or_else(|| invalid("Missing identifier after namespace".to_string()))?;
                let ns: u16 = ns_str
                    .parse()
                    .map_err(|_| invalid(format!("Invalid namespace index '{}'", ns_str)))?;
                (ns, id)
            }
            None => (0, s),
        };

        Ok(Self {
            namespace_index,
            identifier: NodeIdentifier::parse(identifier_part).map_err(invalid)?,
        })
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::root_folder()
    }
}

impl fmt::Display for NodeId {
    /// Canonical text form: `ns=<n>;{i|s|g|b}=<v>`, with `ns=0;` omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index == 0 {
            write!(f, "{}", self.identifier)
        } else {
            write!(f, "ns={};{}", self.namespace_index, self.identifier)
        }
    }
}

impl FromStr for NodeId {
    type Err = OpcUaError;

    /// Parses a NodeId from OPC UA string format.
    ///
    /// Supported formats:
    /// - `ns=2;i=1001` (numeric)
    /// - `ns=2;s=MyNode` (string)
    /// - `ns=2;g=550e8400-e29b-41d4-a716-446655440000` (GUID)
    /// - `ns=2;b=SGVsbG8=` (opaque, base64 encoded)
    /// - `i=84` (namespace 0)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(OpcUaError::invalid_node_id(s, "Empty node ID"));
        }
        Self::parse_with_context(trimmed, trimmed)
    }
}

// =============================================================================
// NodeIdentifier
// =============================================================================

/// The four OPC UA identifier shapes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum NodeIdentifier {
    /// Numeric identifier.
    Numeric(u32),

    /// String identifier.
    String(String),

    /// GUID identifier.
    Guid(Uuid),

    /// Opaque identifier (byte string).
    Opaque(Vec<u8>),
}

impl NodeIdentifier {
    /// Returns the identifier type prefix for OPC UA string format.
    pub const fn type_prefix(&self) -> char {
        match self {
            Self::Numeric(_) => 'i',
            Self::String(_) => 's',
            Self::Guid(_) => 'g',
            Self::Opaque(_) => 'b',
        }
    }

    fn parse(part: &str) -> Result<Self, String> {
        let (prefix, value) = part
            .split_once('=')
            .ok_or_else(|| "Expected i=, s=, g=, or b=".to_string())?;

        match prefix {
            "i" => value
                .parse()
                .map(Self::Numeric)
                .map_err(|_| format!("Invalid numeric identifier '{}'", value)),
            "s" => Ok(Self::String(value.to_string())),
            "g" => Uuid::parse_str(value)
                .map(Self::Guid)
                .map_err(|e| format!("Invalid GUID: {}", e)),
            "b" => BASE64
                .decode(value)
                .map(Self::Opaque)
                .map_err(|e| format!("Invalid base64: {}", e)),
            other => Err(format!(
                "Unknown identifier type '{}'. Expected i=, s=, g=, or b=",
                other
            )),
        }
    }
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(v) => write!(f, "i={}", v),
            Self::String(v) => write!(f, "s={}", v),
            Self::Guid(v) => write!(f, "g={}", v),
            Self::Opaque(v) => write!(f, "b={}", BASE64.encode(v)),
        }
    }
}

// =============================================================================
// ExpandedNodeId
// =============================================================================

/// A NodeId that may point into another server or name its namespace by URI.
///
/// Browse references return expanded IDs; the tree output prints them in
/// their canonical text form.
///
/// ```
/// use uafetch_opcua::types::{ExpandedNodeId, NodeId};
///
/// let local = ExpandedNodeId::from(NodeId::numeric(0, 85));
/// assert_eq!(local.to_string(), "i=85");
///
/// let remote = ExpandedNodeId::new(NodeId::string(0, "Pump"))
///     .with_namespace_uri("urn:plant")
///     .with_server_index(2);
/// assert_eq!(remote.to_string(), "svr=2;nsu=urn:plant;s=Pump");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExpandedNodeId {
    /// The local node ID part.
    pub node_id: NodeId,

    /// Namespace URI; takes precedence over the namespace index when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_uri: Option<String>,

    /// Server index (0 = the local server).
    #[serde(default)]
    pub server_index: u32,
}

impl ExpandedNodeId {
    /// Wraps a local node ID.
    pub fn new(node_id: NodeId) -> Self {
        Self {
            node_id,
            namespace_uri: None,
            server_index: 0,
        }
    }

    /// Sets the namespace URI.
    pub fn with_namespace_uri(mut self, uri: impl Into<String>) -> Self {
        self.namespace_uri = Some(uri.into());
        self
    }

    /// Sets the server index.
    pub fn with_server_index(mut self, index: u32) -> Self {
        self.server_index = index;
        self
    }

    /// Returns `true` if the node lives on the connected server.
    pub fn is_local(&self) -> bool {
        self.server_index == 0
    }

    /// The node ID to browse on the connected server.
    ///
    /// `None` for nodes on another server and for nodes addressed by
    /// namespace URI, whose index on this server is unknown.
    pub fn local_node_id(&self) -> Option<&NodeId> {
        if self.is_local() && self.namespace_uri.is_none() {
            Some(&self.node_id)
        } else {
            None
        }
    }
}

impl From<NodeId> for ExpandedNodeId {
    fn from(node_id: NodeId) -> Self {
        Self::new(node_id)
    }
}

impl fmt::Display for ExpandedNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.server_index != 0 {
            write!(f, "svr={};", self.server_index)?;
        }
        match &self.namespace_uri {
            Some(uri) => write!(f, "nsu={};{}", uri, self.node_id.identifier),
            None => write!(f, "{}", self.node_id),
        }
    }
}

impl FromStr for ExpandedNodeId {
    type Err = OpcUaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let original = s.trim();
        let mut rest = original;

        let mut server_index = 0;
        if let Some(after) = rest.strip_prefix("svr=") {
            let (index, tail) = after
                .split_once(';')
                .ok_or_else(|| OpcUaError::invalid_node_id(original, "Missing node after svr="))?;
            server_index = index
                .parse()
                .map_err(|_| OpcUaError::invalid_node_id(original, "Invalid server index"))?;
            rest = tail;
        }

        if let Some(after) = rest.strip_prefix("nsu=") {
            // Namespace URIs may contain ';' so split on the last one.
            let (uri, id) = after
                .rsplit_once(';')
                .ok_or_else(|| OpcUaError::invalid_node_id(original, "Missing node after nsu="))?;
            let identifier = NodeIdentifier::parse(id)
                .map_err(|reason| OpcUaError::invalid_node_id(original, reason))?;
            return Ok(Self {
                node_id: NodeId {
                    namespace_index: 0,
                    identifier,
                },
                namespace_uri: Some(uri.to_string()),
                server_index,
            });
        }

        Ok(Self {
            node_id: NodeId::parse_with_context(rest, original)?,
            namespace_uri: None,
            server_index,
        })
    }
}

// =============================================================================
// SecurityPolicy
// =============================================================================

/// Message security policy advertised by endpoints.
///
/// `Basic256Rsa256` is the configuration name for the policy whose URI ends
/// in `#Basic256Sha256`; both names are accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SecurityPolicy {
    /// No message security.
    #[default]
    None,

    /// Basic128Rsa15 (deprecated, for legacy systems).
    Basic128Rsa15,

    /// Basic256 (deprecated, for legacy systems).
    Basic256,

    /// Basic256 with SHA-256 signatures.
    #[serde(alias = "Basic256Sha256")]
    Basic256Rsa256,
}

impl SecurityPolicy {
    /// All supported policies.
    pub const ALL: [SecurityPolicy; 4] = [
        Self::None,
        Self::Basic128Rsa15,
        Self::Basic256,
        Self::Basic256Rsa256,
    ];

    /// Returns the OPC UA policy URI.
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::None => "http://opcfoundation.org/UA/SecurityPolicy#None",
            Self::Basic128Rsa15 => "http://opcfoundation.org/UA/SecurityPolicy#Basic128Rsa15",
            Self::Basic256 => "http://opcfoundation.org/UA/SecurityPolicy#Basic256",
            Self::Basic256Rsa256 => "http://opcfoundation.org/UA/SecurityPolicy#Basic256Sha256",
        }
    }

    /// Returns the configuration name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Basic128Rsa15 => "Basic128Rsa15",
            Self::Basic256 => "Basic256",
            Self::Basic256Rsa256 => "Basic256Rsa256",
        }
    }

    /// Returns `true` if this policy is deprecated.
    #[inline]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::Basic128Rsa15 | Self::Basic256)
    }

    /// Returns `true` if an application instance certificate is required.
    #[inline]
    pub const fn requires_certificates(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Creates from a policy URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri.rsplit_once('#').map(|(_, name)| name) {
            Some("None") => Some(Self::None),
            Some("Basic128Rsa15") => Some(Self::Basic128Rsa15),
            Some("Basic256") => Some(Self::Basic256),
            Some("Basic256Sha256") => Some(Self::Basic256Rsa256),
            _ => Option::None,
        }
    }

    /// Parses a policy name, returning `None` when it is not recognized.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl fmt::Display for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SecurityPolicy {
    type Err = OpcUaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(policy) = Self::from_uri(s) {
            return Ok(policy);
        }

        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "none" => Ok(Self::None),
            "basic128rsa15" => Ok(Self::Basic128Rsa15),
            "basic256" => Ok(Self::Basic256),
            "basic256rsa256" | "basic256sha256" => Ok(Self::Basic256Rsa256),
            _ => Err(OpcUaError::configuration(ConfigurationError::invalid_value(
                "security_policy",
                format!(
                    "'{}' is not one of None, Basic128Rsa15, Basic256, Basic256Rsa256",
                    s
                ),
            ))),
        }
    }
}

// =============================================================================
// SecurityMode
// =============================================================================

/// Message security mode advertised alongside a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SecurityMode {
    /// Messages are neither signed nor encrypted.
    #[default]
    None,
    /// Messages are signed.
    Sign,
    /// Messages are signed and encrypted.
    SignAndEncrypt,
}

impl SecurityMode {
    /// Returns the OPC UA enumeration value.
    pub const fn value(&self) -> u32 {
        match self {
            Self::None => 1,
            Self::Sign => 2,
            Self::SignAndEncrypt => 3,
        }
    }

    /// Creates from the OPC UA enumeration value.
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            1 => Some(Self::None),
            2 => Some(Self::Sign),
            3 => Some(Self::SignAndEncrypt),
            _ => None,
        }
    }

    /// Returns the display name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Sign => "Sign",
            Self::SignAndEncrypt => "SignAndEncrypt",
        }
    }
}

impl fmt::Display for SecurityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// TransportProtocol
// =============================================================================

/// Transport protocol of an endpoint, derived from its URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TransportProtocol {
    /// OPC UA binary over TCP (`opc.tcp://`).
    #[default]
    #[serde(rename = "opc.tcp")]
    OpcTcp,
    /// OPC UA over HTTPS (`https://`).
    #[serde(rename = "https")]
    Https,
    /// OPC UA over secure WebSockets (`opc.wss://`).
    #[serde(rename = "opc.wss")]
    OpcWss,
}

impl TransportProtocol {
    /// Returns the URL scheme.
    pub const fn scheme(&self) -> &'static str {
        match self {
            Self::OpcTcp => "opc.tcp",
            Self::Https => "https",
            Self::OpcWss => "opc.wss",
        }
    }

    /// Returns the transport profile URI advertised by servers.
    pub const fn profile_uri(&self) -> &'static str {
        match self {
            Self::OpcTcp => "http://opcfoundation.org/UA-Profile/Transport/uatcp-uasc-uabinary",
            Self::Https => "http://opcfoundation.org/UA-Profile/Transport/https-uabinary",
            Self::OpcWss => "http://opcfoundation.org/UA-Profile/Transport/wss-uasc-uabinary",
        }
    }

    /// Derives the protocol from a URL scheme. Case-insensitive.
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once("://")?;
        match scheme.to_ascii_lowercase().as_str() {
            "opc.tcp" => Some(Self::OpcTcp),
            "https" => Some(Self::Https),
            "opc.wss" => Some(Self::OpcWss),
            _ => None,
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scheme())
    }
}

impl FromStr for TransportProtocol {
    type Err = OpcUaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "opc.tcp" | "opctcp" | "tcp" => Ok(Self::OpcTcp),
            "https" => Ok(Self::Https),
            "opc.wss" | "wss" => Ok(Self::OpcWss),
            _ => Err(OpcUaError::configuration(ConfigurationError::invalid_value(
                "transport_protocol",
                format!("unknown transport '{}'", s),
            ))),
        }
    }
}

// =============================================================================
// Service parameters
// =============================================================================

/// Node attribute selectors used by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum AttributeId {
    /// NodeId attribute.
    NodeId = 1,
    /// NodeClass attribute.
    NodeClass = 2,
    /// BrowseName attribute.
    BrowseName = 3,
    /// DisplayName attribute.
    DisplayName = 4,
    /// Value attribute.
    Value = 13,
}

impl AttributeId {
    /// Returns the numeric attribute ID.
    pub const fn as_u32(&self) -> u32 {
        *self as u32
    }
}

/// Direction of references followed by a browse request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BrowseDirection {
    /// Parent to child.
    #[default]
    Forward,
    /// Child to parent.
    Inverse,
    /// Both directions.
    Both,
}

/// Node class bitmask values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u32)]
pub enum NodeClass {
    /// Unspecified.
    #[default]
    Unspecified = 0,
    /// Object node.
    Object = 1,
    /// Variable node.
    Variable = 2,
    /// Method node.
    Method = 4,
    /// ObjectType node.
    ObjectType = 8,
    /// VariableType node.
    VariableType = 16,
    /// ReferenceType node.
    ReferenceType = 32,
    /// DataType node.
    DataType = 64,
    /// View node.
    View = 128,
}

impl NodeClass {
    /// Creates from the bitmask value.
    pub fn from_value(value: u32) -> Self {
        match value {
            1 => Self::Object,
            2 => Self::Variable,
            4 => Self::Method,
            8 => Self::ObjectType,
            16 => Self::VariableType,
            32 => Self::ReferenceType,
            64 => Self::DataType,
            128 => Self::View,
            _ => Self::Unspecified,
        }
    }
}

/// Which timestamps the server returns with a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimestampsToReturn {
    /// Source timestamp only.
    Source,
    /// Server timestamp only.
    Server,
    /// Both timestamps.
    #[default]
    Both,
    /// No timestamps.
    Neither,
}

// =============================================================================
// StatusCode
// =============================================================================

/// OPC UA status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct StatusCode(pub u32);

impl StatusCode {
    /// Good.
    pub const GOOD: Self = Self(0x0000_0000);
    /// BadUnexpectedError.
    pub const BAD_UNEXPECTED_ERROR: Self = Self(0x8001_0000);
    /// BadInternalError.
    pub const BAD_INTERNAL_ERROR: Self = Self(0x8002_0000);
    /// BadCommunicationError.
    pub const BAD_COMMUNICATION_ERROR: Self = Self(0x8005_0000);
    /// BadDecodingError.
    pub const BAD_DECODING_ERROR: Self = Self(0x8007_0000);
    /// BadTimeout.
    pub const BAD_TIMEOUT: Self = Self(0x800A_0000);
    /// BadServiceUnsupported.
    pub const BAD_SERVICE_UNSUPPORTED: Self = Self(0x800B_0000);
    /// BadServerNotConnected.
    pub const BAD_SERVER_NOT_CONNECTED: Self = Self(0x800D_0000);
    /// BadCertificateInvalid.
    pub const BAD_CERTIFICATE_INVALID: Self = Self(0x8012_0000);
    /// BadSecurityChecksFailed.
    pub const BAD_SECURITY_CHECKS_FAILED: Self = Self(0x8013_0000);
    /// BadCertificateUntrusted.
    pub const BAD_CERTIFICATE_UNTRUSTED: Self = Self(0x801A_0000);
    /// BadUserAccessDenied.
    pub const BAD_USER_ACCESS_DENIED: Self = Self(0x801F_0000);
    /// BadIdentityTokenRejected.
    pub const BAD_IDENTITY_TOKEN_REJECTED: Self = Self(0x8021_0000);
    /// BadSessionIdInvalid.
    pub const BAD_SESSION_ID_INVALID: Self = Self(0x8025_0000);
    /// BadSessionClosed.
    pub const BAD_SESSION_CLOSED: Self = Self(0x8026_0000);
    /// BadSessionNotActivated.
    pub const BAD_SESSION_NOT_ACTIVATED: Self = Self(0x8027_0000);
    /// BadTooManySessions.
    pub const BAD_TOO_MANY_SESSIONS: Self = Self(0x8056_0000);
    /// BadNodeIdInvalid.
    pub const BAD_NODE_ID_INVALID: Self = Self(0x8033_0000);
    /// BadNodeIdUnknown.
    pub const BAD_NODE_ID_UNKNOWN: Self = Self(0x8034_0000);
    /// BadNotReadable.
    pub const BAD_NOT_READABLE: Self = Self(0x803A_0000);
    /// BadTcpEndpointUrlInvalid.
    pub const BAD_TCP_ENDPOINT_URL_INVALID: Self = Self(0x8083_0000);
    /// BadConnectionClosed.
    pub const BAD_CONNECTION_CLOSED: Self = Self(0x80AE_0000);

    /// Returns `true` when the severity bits are Good.
    pub const fn is_good(&self) -> bool {
        self.0 & 0xC000_0000 == 0
    }

    /// Returns `true` when the severity bits are Bad.
    pub const fn is_bad(&self) -> bool {
        self.0 & 0x8000_0000 != 0
    }

    /// Returns the symbolic name, or `None` for codes this crate does not name.
    pub fn name(&self) -> Option<&'static str> {
        let name = match *self {
            Self::GOOD => "Good",
            Self::BAD_UNEXPECTED_ERROR => "BadUnexpectedError",
            Self::BAD_INTERNAL_ERROR => "BadInternalError",
            Self::BAD_COMMUNICATION_ERROR => "BadCommunicationError",
            Self::BAD_DECODING_ERROR => "BadDecodingError",
            Self::BAD_TIMEOUT => "BadTimeout",
            Self::BAD_SERVICE_UNSUPPORTED => "BadServiceUnsupported",
            Self::BAD_SERVER_NOT_CONNECTED => "BadServerNotConnected",
            Self::BAD_CERTIFICATE_INVALID => "BadCertificateInvalid",
            Self::BAD_SECURITY_CHECKS_FAILED => "BadSecurityChecksFailed",
            Self::BAD_CERTIFICATE_UNTRUSTED => "BadCertificateUntrusted",
            Self::BAD_USER_ACCESS_DENIED => "BadUserAccessDenied",
            Self::BAD_IDENTITY_TOKEN_REJECTED => "BadIdentityTokenRejected",
            Self::BAD_SESSION_ID_INVALID => "BadSessionIdInvalid",
            Self::BAD_SESSION_CLOSED => "BadSessionClosed",
            Self::BAD_SESSION_NOT_ACTIVATED => "BadSessionNotActivated",
            Self::BAD_TOO_MANY_SESSIONS => "BadTooManySessions",
            Self::BAD_NODE_ID_INVALID => "BadNodeIdInvalid",
            Self::BAD_NODE_ID_UNKNOWN => "BadNodeIdUnknown",
            Self::BAD_NOT_READABLE => "BadNotReadable",
            Self::BAD_TCP_ENDPOINT_URL_INVALID => "BadTcpEndpointUrlInvalid",
            Self::BAD_CONNECTION_CLOSED => "BadConnectionClosed",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "0x{:08X}", self.0),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
