// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! [`ScriptedTransport`] answers every [`UaTransport`] exchange from canned
//! data and records the calls it received.
//!
//! ## Design Principles
//!
//! - Configurable behavior for different test scenarios
//! - Recording of interactions for verification
//! - Thread-safe for concurrent testing
//! - Easy to set up error injection

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use uafetch_opcua::{
    BrowseDescription, ChannelId, ClientIdentity, DataValue, Endpoint, NodeId, ReadRequest,
    ReferenceDescription, SecurityMaterial, ServiceFault, StatusCode, UaTransport,
};

// =============================================================================
// Call Counters
// =============================================================================

/// Number of calls per exchange.
#[derive(Debug, Default)]
pub struct CallCounters {
    discover: AtomicU64,
    create_channel: AtomicU64,
    activate: AtomicU64,
    read: AtomicU64,
    browse: AtomicU64,
    close: AtomicU64,
}

impl CallCounters {
    /// Endpoint discoveries.
    pub fn discover(&self) -> u64 {
        self.discover.load(Ordering::SeqCst)
    }

    /// Channel creations (successful or not).
    pub fn create_channel(&self) -> u64 {
        self.create_channel.load(Ordering::SeqCst)
    }

    /// Session activations.
    pub fn activate(&self) -> u64 {
        self.activate.load(Ordering::SeqCst)
    }

    /// Read requests.
    pub fn read(&self) -> u64 {
        self.read.load(Ordering::SeqCst)
    }

    /// Browse requests.
    pub fn browse(&self) -> u64 {
        self.browse.load(Ordering::SeqCst)
    }

    /// Channel closes.
    pub fn close(&self) -> u64 {
        self.close.load(Ordering::SeqCst)
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Stage
// =============================================================================

/// A transport call that can be made to hang.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Endpoint discovery.
    Discovery,
    /// Secure channel creation.
    Channel,
    /// Session activation.
    Activation,
    /// Value reads.
    Read,
    /// Channel close.
    Close,
}

// =============================================================================
// ScriptedTransport
// =============================================================================

/// A transport whose server side is a script.
///
/// Unknown nodes read as `BadNodeIdUnknown` and browse to no references.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    endpoints: RwLock<Vec<Endpoint>>,
    values: RwLock<HashMap<NodeId, DataValue>>,
    references: RwLock<HashMap<NodeId, Vec<ReferenceDescription>>>,
    failing_browse: RwLock<HashSet<NodeId>>,
    hanging_browse: RwLock<HashSet<NodeId>>,
    hanging: RwLock<HashSet<Stage>>,

    fail_discovery: AtomicBool,
    fail_channel: AtomicBool,
    fail_activation: AtomicBool,
    fail_read: AtomicBool,
    fail_close: AtomicBool,

    next_channel: AtomicU64,
    open_channels: Mutex<HashSet<ChannelId>>,
    calls: CallCounters,

    read_requests: Mutex<Vec<ReadRequest>>,
    browsed: Mutex<Vec<NodeId>>,
    channel_materials: Mutex<Vec<bool>>,
}

impl ScriptedTransport {
    /// Creates an empty script: no endpoints, no values, no references.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Script
    // -------------------------------------------------------------------------

    /// Replaces the advertised endpoints.
    pub fn set_endpoints(&self, endpoints: Vec<Endpoint>) {
        *self.endpoints.write() = endpoints;
    }

    /// Sets the value returned for a node.
    pub fn set_value(&self, node: NodeId, value: DataValue) {
        self.values.write().insert(node, value);
    }

    /// Appends a reference below `parent`.
    pub fn add_reference(&self, parent: NodeId, reference: ReferenceDescription) {
        self.references
            .write()
            .entry(parent)
            .or_default()
            .push(reference);
    }

    /// Makes browsing `node` fault.
    pub fn fail_browse_of(&self, node: NodeId) {
        self.failing_browse.write().insert(node);
    }

    /// Makes browsing `node` never answer.
    pub fn hang_browse_of(&self, node: NodeId) {
        self.hanging_browse.write().insert(node);
    }

    /// Makes every call of `stage` never answer.
    pub fn hang(&self, stage: Stage) {
        self.hanging.write().insert(stage);
    }

    /// Makes discovery fault.
    pub fn set_fail_discovery(&self, fail: bool) {
        self.fail_discovery.store(fail, Ordering::SeqCst);
    }

    /// Makes channel creation fault.
    pub fn set_fail_channel(&self, fail: bool) {
        self.fail_channel.store(fail, Ordering::SeqCst);
    }

    /// Makes activation fault.
    pub fn set_fail_activation(&self, fail: bool) {
        self.fail_activation.store(fail, Ordering::SeqCst);
    }

    /// Makes reads fault.
    pub fn set_fail_read(&self, fail: bool) {
        self.fail_read.store(fail, Ordering::SeqCst);
    }

    /// Makes closes fault.
    pub fn set_fail_close(&self, fail: bool) {
        self.fail_close.store(fail, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Recording
    // -------------------------------------------------------------------------

    /// Call counters.
    pub fn calls(&self) -> &CallCounters {
        &self.calls
    }

    /// Channels created and not yet closed.
    pub fn open_channel_count(&self) -> usize {
        self.open_channels.lock().len()
    }

    /// Read requests received, oldest first.
    pub fn read_requests(&self) -> Vec<ReadRequest> {
        self.read_requests.lock().clone()
    }

    /// Nodes browsed, in request order.
    pub fn browsed_nodes(&self) -> Vec<NodeId> {
        self.browsed.lock().clone()
    }

    /// For each channel creation, whether an instance certificate was supplied.
    pub fn channel_certificates(&self) -> Vec<bool> {
        self.channel_materials.lock().clone()
    }

    async fn stall(&self, stage: Stage) {
        let hangs = self.hanging.read().contains(&stage);
        if hangs {
            std::future::pending::<()>().await;
        }
    }

    fn fault(what: &str) -> ServiceFault {
        ServiceFault::communication(format!("scripted {} failure", what))
    }
}

#[async_trait]
impl UaTransport for ScriptedTransport {
    async fn discover_endpoints(
        &self,
        _url: &str,
        _identity: &ClientIdentity,
    ) -> Result<Vec<Endpoint>, ServiceFault> {
        CallCounters::bump(&self.calls.discover);
        self.stall(Stage::Discovery).await;
        if self.fail_discovery.load(Ordering::SeqCst) {
            return Err(Self::fault("discovery"));
        }
        Ok(self.endpoints.read().clone())
    }

    async fn create_channel(
        &self,
        _endpoint: &Endpoint,
        material: &SecurityMaterial,
        _identity: &ClientIdentity,
    ) -> Result<ChannelId, ServiceFault> {
        CallCounters::bump(&self.calls.create_channel);
        self.stall(Stage::Channel).await;
        self.channel_materials
            .lock()
            .push(material.has_instance_certificate());
        if self.fail_channel.load(Ordering::SeqCst) {
            return Err(Self::fault("channel"));
        }

        let channel = ChannelId(self.next_channel.fetch_add(1, Ordering::SeqCst) + 1);
        self.open_channels.lock().insert(channel);
        Ok(channel)
    }

    async fn activate_session(&self, _channel: ChannelId) -> Result<(), ServiceFault> {
        CallCounters::bump(&self.calls.activate);
        self.stall(Stage::Activation).await;
        if self.fail_activation.load(Ordering::SeqCst) {
            return Err(ServiceFault::new(
                StatusCode::BAD_IDENTITY_TOKEN_REJECTED,
                "scripted activation failure",
            ));
        }
        Ok(())
    }

    async fn read(
        &self,
        _channel: ChannelId,
        request: &ReadRequest,
    ) -> Result<Vec<DataValue>, ServiceFault> {
        CallCounters::bump(&self.calls.read);
        self.read_requests.lock().push(request.clone());
        self.stall(Stage::Read).await;
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(Self::fault("read"));
        }

        let values = self.values.read();
        Ok(request
            .nodes_to_read
            .iter()
            .map(|target| {
                values.get(&target.node_id).cloned().unwrap_or_else(|| DataValue {
                    status: StatusCode::BAD_NODE_ID_UNKNOWN,
                    ..DataValue::default()
                })
            })
            .collect())
    }

    async fn browse(
        &self,
        _channel: ChannelId,
        description: &BrowseDescription,
    ) -> Result<Vec<ReferenceDescription>, ServiceFault> {
        CallCounters::bump(&self.calls.browse);
        self.browsed.lock().push(description.node_id.clone());
        let hangs = self.hanging_browse.read().contains(&description.node_id);
        if hangs {
            std::future::pending::<()>().await;
        }
        if self.failing_browse.read().contains(&description.node_id) {
            return Err(Self::fault("browse"));
        }

        Ok(self
            .references
            .read()
            .get(&description.node_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn close_channel(&self, channel: ChannelId) -> Result<(), ServiceFault> {
        CallCounters::bump(&self.calls.close);
        self.stall(Stage::Close).await;
        self.open_channels.lock().remove(&channel);
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(Self::fault("close"));
        }
        Ok(())
    }

    fn display_name(&self) -> String {
        "scripted".to_string()
    }
}
