// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! [`UaTransport`] backed by the `opcua` crate.
//!
//! The `opcua` client API is synchronous, so every exchange runs on the
//! blocking pool. Each channel owns its own `opcua` client and session; a
//! channel handle maps to that session until it is closed.
//!
//! The `opcua` crate signs with RSA keys, which is what the built-in
//! generator produces.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use opcua::client::prelude as ua;
use opcua::sync::RwLock as UaRwLock;

use super::transport::{
    BrowseDescription, ChannelId, ClientIdentity, DataValue, Endpoint, ReadRequest,
    ReferenceDescription, UaTransport, Variant,
};
use crate::certificate::SecurityMaterial;
use crate::config::ClientSettings;
use crate::error::ServiceFault;
use crate::types::{
    BrowseDirection, ExpandedNodeId, NodeClass, NodeId, NodeIdentifier, SecurityMode, StatusCode,
    TimestampsToReturn,
};

type SharedSession = Arc<UaRwLock<ua::Session>>;

// =============================================================================
// RealUaTransport
// =============================================================================

/// Transport talking to real servers.
pub struct RealUaTransport {
    pki_dir: PathBuf,
    trust_server_certs: bool,
    session_timeout: Duration,
    sessions: Mutex<HashMap<ChannelId, SharedSession>>,
    next_channel: AtomicU64,
}

impl RealUaTransport {
    /// Creates a transport from client settings.
    pub fn new(settings: &ClientSettings) -> Self {
        Self {
            pki_dir: settings.pki_dir.clone(),
            trust_server_certs: settings.trust_server_certs,
            session_timeout: settings.session_timeout,
            sessions: Mutex::new(HashMap::new()),
            next_channel: AtomicU64::new(1),
        }
    }

    /// Number of open channels.
    pub fn open_channels(&self) -> usize {
        self.sessions.lock().len()
    }

    fn build_client(
        &self,
        identity: &ClientIdentity,
        material: Option<&SecurityMaterial>,
    ) -> Result<ua::Client, ServiceFault> {
        let mut builder = ua::ClientBuilder::new()
            .application_name(identity.application_name.as_str())
            .application_uri(identity.application_uri.as_str())
            .product_uri(identity.product_uri.as_str())
            .pki_dir(self.pki_dir.clone())
            .preferred_locales(identity.locales.clone())
            .trust_server_certs(self.trust_server_certs)
            .session_timeout(self.session_timeout.as_millis().min(u32::MAX as u128) as u32)
            .session_retry_limit(0)
            .create_sample_keypair(false);

        if let Some(instance) = material.and_then(SecurityMaterial::instance) {
            if let (Some(cert), Some(key)) = (&instance.certificate_path, &instance.private_key_path) {
                builder = builder.certificate_path(cert.clone()).private_key_path(key.clone());
            }
        }

        builder
            .client()
            .ok_or_else(|| ServiceFault::new(StatusCode::BAD_INTERNAL_ERROR, "invalid client configuration"))
    }

    fn session(&self, channel: ChannelId) -> Result<SharedSession, ServiceFault> {
        self.sessions.lock().get(&channel).cloned().ok_or_else(|| {
            ServiceFault::new(StatusCode::BAD_SESSION_ID_INVALID, format!("unknown {}", channel))
        })
    }
}

/// Runs a synchronous `opcua` call on the blocking pool.
async fn blocking<R, F>(call: F) -> Result<R, ServiceFault>
where
    F: FnOnce() -> Result<R, ServiceFault> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ServiceFault::new(StatusCode::BAD_INTERNAL_ERROR, format!("worker failed: {}", e)))?
}

fn fault(status: ua::StatusCode, context: &str) -> ServiceFault {
    ServiceFault::new(StatusCode(status.bits()), format!("{} failed: {}", context, status))
}

/// The two steps that bring a session up on an `opcua` client.
trait SessionSetup {
    fn connect(&mut self) -> Result<(), ua::StatusCode>;
    fn create_session(&mut self) -> Result<(), ua::StatusCode>;
    fn disconnect(&mut self);
}

impl SessionSetup for ua::Session {
    fn connect(&mut self) -> Result<(), ua::StatusCode> {
        ua::Session::connect(self)
    }

    fn create_session(&mut self) -> Result<(), ua::StatusCode> {
        ua::Session::create_session(self).map(|_| ())
    }

    fn disconnect(&mut self) {
        ua::Session::disconnect(self)
    }
}

/// Opens the secure channel and creates the session on it.
///
/// The channel is disconnected again when session creation fails, so a
/// failed attempt leaves no socket behind.
fn establish(session: &mut impl SessionSetup) -> Result<(), ServiceFault> {
    session.connect().map_err(|s| fault(s, "OpenSecureChannel"))?;
    if let Err(status) = session.create_session() {
        tracing::debug!(status = %status, "CreateSession failed, disconnecting channel");
        session.disconnect();
        return Err(fault(status, "CreateSession"));
    }
    Ok(())
}

#[async_trait]
impl UaTransport for RealUaTransport {
    async fn discover_endpoints(
        &self,
        url: &str,
        identity: &ClientIdentity,
    ) -> Result<Vec<Endpoint>, ServiceFault> {
        let client = self.build_client(identity, None)?;
        let url = url.to_string();

        let descriptions = blocking(move || {
            client
                .get_server_endpoints_from_url(url.as_str())
                .map_err(|s| fault(s, "GetEndpoints"))
        })
        .await?;

        Ok(descriptions.iter().map(from_ua_endpoint).collect())
    }

    async fn create_channel(
        &self,
        endpoint: &Endpoint,
        material: &SecurityMaterial,
        identity: &ClientIdentity,
    ) -> Result<ChannelId, ServiceFault> {
        let mut client = self.build_client(identity, Some(material))?;
        let description = ua::EndpointDescription::from((
            endpoint.url.as_str(),
            endpoint.security_policy_uri.as_str(),
            to_ua_security_mode(endpoint.security_mode),
        ));

        let session = blocking(move || {
            let session = client
                .new_session_from_endpoint(description, ua::IdentityToken::Anonymous)
                .map_err(|s| fault(s, "CreateSession"))?;
            establish(&mut *session.write())?;
            Ok(session)
        })
        .await?;

        let channel = ChannelId(self.next_channel.fetch_add(1, Ordering::Relaxed));
        self.sessions.lock().insert(channel, session);
        Ok(channel)
    }

    async fn activate_session(&self, channel: ChannelId) -> Result<(), ServiceFault> {
        let session = self.session(channel)?;
        blocking(move || {
            session
                .write()
                .activate_session()
                .map_err(|s| fault(s, "ActivateSession"))
        })
        .await
    }

    async fn read(
        &self,
        channel: ChannelId,
        request: &ReadRequest,
    ) -> Result<Vec<DataValue>, ServiceFault> {
        let session = self.session(channel)?;
        let nodes: Vec<ua::ReadValueId> = request
            .nodes_to_read
            .iter()
            .map(|id| ua::ReadValueId {
                node_id: to_ua_node_id(&id.node_id),
                attribute_id: id.attribute_id.as_u32(),
                index_range: ua::UAString::null(),
                data_encoding: ua::QualifiedName::null(),
            })
            .collect();
        let timestamps = match request.timestamps_to_return {
            TimestampsToReturn::Source => ua::TimestampsToReturn::Source,
            TimestampsToReturn::Server => ua::TimestampsToReturn::Server,
            TimestampsToReturn::Both => ua::TimestampsToReturn::Both,
            TimestampsToReturn::Neither => ua::TimestampsToReturn::Neither,
        };
        let max_age = request.max_age;

        let values = blocking(move || {
            session
                .read()
                .read(&nodes, timestamps, max_age)
                .map_err(|s| fault(s, "Read"))
        })
        .await?;

        Ok(values.iter().map(from_ua_data_value).collect())
    }

    async fn browse(
        &self,
        channel: ChannelId,
        description: &BrowseDescription,
    ) -> Result<Vec<ReferenceDescription>, ServiceFault> {
        let session = self.session(channel)?;
        let request = ua::BrowseDescription {
            node_id: to_ua_node_id(&description.node_id),
            browse_direction: match description.browse_direction {
                BrowseDirection::Forward => ua::BrowseDirection::Forward,
                BrowseDirection::Inverse => ua::BrowseDirection::Inverse,
                BrowseDirection::Both => ua::BrowseDirection::Both,
            },
            reference_type_id: to_ua_node_id(&description.reference_type_id),
            include_subtypes: description.include_subtypes,
            node_class_mask: description.node_class_mask,
            result_mask: ua::BrowseDescriptionResultMask::all().bits(),
        };

        let results = blocking(move || {
            session
                .read()
                .browse(&[request])
                .map_err(|s| fault(s, "Browse"))
        })
        .await?;

        let Some(result) = results.and_then(|r| r.into_iter().next()) else {
            return Ok(Vec::new());
        };
        if result.status_code.is_bad() {
            return Err(fault(result.status_code, "Browse"));
        }

        Ok(result
            .references
            .unwrap_or_default()
            .iter()
            .map(|r| ReferenceDescription {
                node_id: ExpandedNodeId {
                    node_id: from_ua_node_id(&r.node_id.node_id),
                    namespace_uri: (!r.node_id.namespace_uri.is_null())
                        .then(|| r.node_id.namespace_uri.as_ref().to_string()),
                    server_index: r.node_id.server_index,
                },
                browse_name: r.browse_name.name.as_ref().to_string(),
                display_name: r.display_name.text.as_ref().to_string(),
                node_class: NodeClass::from_value(r.node_class as u32),
                reference_type_id: from_ua_node_id(&r.reference_type_id),
                is_forward: r.is_forward,
            })
            .collect())
    }

    async fn close_channel(&self, channel: ChannelId) -> Result<(), ServiceFault> {
        let Some(session) = self.sessions.lock().remove(&channel) else {
            return Ok(());
        };
        blocking(move || {
            session.read().disconnect();
            Ok(())
        })
        .await
    }

    fn display_name(&self) -> String {
        format!("opcua ({})", self.pki_dir.display())
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn to_ua_security_mode(mode: SecurityMode) -> ua::MessageSecurityMode {
    match mode {
        SecurityMode::None => ua::MessageSecurityMode::None,
        SecurityMode::Sign => ua::MessageSecurityMode::Sign,
        SecurityMode::SignAndEncrypt => ua::MessageSecurityMode::SignAndEncrypt,
    }
}

fn from_ua_security_mode(mode: ua::MessageSecurityMode) -> SecurityMode {
    match mode {
        ua::MessageSecurityMode::Sign => SecurityMode::Sign,
        ua::MessageSecurityMode::SignAndEncrypt => SecurityMode::SignAndEncrypt,
        _ => SecurityMode::None,
    }
}

fn from_ua_endpoint(e: &ua::EndpointDescription) -> Endpoint {
    Endpoint {
        url: e.endpoint_url.as_ref().to_string(),
        security_policy_uri: e.security_policy_uri.as_ref().to_string(),
        security_mode: from_ua_security_mode(e.security_mode),
        transport_profile_uri: e.transport_profile_uri.as_ref().to_string(),
        security_level: e.security_level,
        server_certificate: e.server_certificate.value.clone(),
    }
}

fn to_ua_node_id(node_id: &NodeId) -> ua::NodeId {
    let ns = node_id.namespace_index;
    match &node_id.identifier {
        NodeIdentifier::Numeric(v) => ua::NodeId::new(ns, *v),
        NodeIdentifier::String(v) => ua::NodeId::new(ns, ua::UAString::from(v.as_str())),
        NodeIdentifier::Guid(v) => ua::NodeId::new(ns, ua::Guid::from(*v)),
        NodeIdentifier::Opaque(v) => ua::NodeId::new(ns, ua::ByteString::from(v.as_slice())),
    }
}

fn from_ua_node_id(node_id: &ua::NodeId) -> NodeId {
    let ns = node_id.namespace;
    match &node_id.identifier {
        ua::Identifier::Numeric(v) => NodeId::numeric(ns, *v),
        ua::Identifier::String(v) => NodeId::string(ns, v.as_ref()),
        ua::Identifier::Guid(v) => NodeId::guid(ns, uuid::Uuid::from_bytes(*v.as_bytes())),
        ua::Identifier::ByteString(v) => NodeId::opaque(ns, v.value.clone().unwrap_or_default()),
    }
}

fn from_ua_variant(variant: &ua::Variant) -> Variant {
    match variant {
        ua::Variant::Empty => Variant::Null,
        ua::Variant::Boolean(v) => Variant::Boolean(*v),
        ua::Variant::SByte(v) => Variant::SByte(*v),
        ua::Variant::Byte(v) => Variant::Byte(*v),
        ua::Variant::Int16(v) => Variant::Int16(*v),
        ua::Variant::UInt16(v) => Variant::UInt16(*v),
        ua::Variant::Int32(v) => Variant::Int32(*v),
        ua::Variant::UInt32(v) => Variant::UInt32(*v),
        ua::Variant::Int64(v) => Variant::Int64(*v),
        ua::Variant::UInt64(v) => Variant::UInt64(*v),
        ua::Variant::Float(v) => Variant::Float(*v),
        ua::Variant::Double(v) => Variant::Double(*v),
        ua::Variant::String(v) => Variant::String(v.as_ref().to_string()),
        ua::Variant::DateTime(v) => Variant::DateTime(v.as_chrono()),
        ua::Variant::Guid(v) => Variant::Guid(uuid::Uuid::from_bytes(*v.as_bytes())),
        ua::Variant::ByteString(v) => Variant::ByteString(v.value.clone().unwrap_or_default()),
        ua::Variant::Array(array) => Variant::Array(array.values.iter().map(from_ua_variant).collect()),
        // Structured values are rendered as their debug text.
        other => Variant::String(format!("{:?}", other)),
    }
}

fn from_ua_data_value(value: &ua::DataValue) -> DataValue {
    DataValue {
        value: value.value.as_ref().map(from_ua_variant).unwrap_or_default(),
        status: StatusCode(value.status.as_ref().map(|s| s.bits()).unwrap_or(0)),
        source_timestamp: value.source_timestamp.as_ref().map(|t| t.as_chrono()),
        server_timestamp: value.server_timestamp.as_ref().map(|t| t.as_chrono()),
    }
}
