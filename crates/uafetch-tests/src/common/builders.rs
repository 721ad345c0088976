// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Builders
//!
//! Fluent construction of scripted transports and engines.

use std::sync::Arc;

use uafetch_opcua::{
    ClientSettings, DataValue, Endpoint, MemoryCertificateProvider, NodeId, SecurityContext,
    UaEngine, Variant,
};

use super::fixtures::{Fixtures, TreeFixture};
use super::mocks::ScriptedTransport;

// =============================================================================
// TransportBuilder
// =============================================================================

/// Builder for [`ScriptedTransport`].
#[derive(Debug, Default)]
pub struct TransportBuilder {
    endpoints: Vec<Endpoint>,
    values: Vec<(NodeId, DataValue)>,
    tree: TreeFixture,
    failing_browse: Vec<NodeId>,
    fail_discovery: bool,
    fail_activation: bool,
    fail_read: bool,
    fail_close: bool,
}

impl TransportBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertised endpoints.
    pub fn endpoints(mut self, endpoints: Vec<Endpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// A value with the canned server timestamp.
    pub fn value(mut self, node: NodeId, value: impl Into<Variant>) -> Self {
        self.values
            .push((node, DataValue::new(value, Fixtures::server_timestamp())));
        self
    }

    /// A fully specified data value.
    pub fn data_value(mut self, node: NodeId, value: DataValue) -> Self {
        self.values.push((node, value));
        self
    }

    /// Address-space references.
    pub fn tree(mut self, tree: TreeFixture) -> Self {
        self.tree.edges.extend(tree.edges);
        self
    }

    /// Browsing `node` faults.
    pub fn fail_browse_of(mut self, node: NodeId) -> Self {
        self.failing_browse.push(node);
        self
    }

    /// Discovery faults.
    pub fn fail_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    /// Activation faults.
    pub fn fail_activation(mut self) -> Self {
        self.fail_activation = true;
        self
    }

    /// Reads fault.
    pub fn fail_read(mut self) -> Self {
        self.fail_read = true;
        self
    }

    /// Closes fault.
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Builds the transport.
    pub fn build(self) -> Arc<ScriptedTransport> {
        let transport = ScriptedTransport::new();
        transport.set_endpoints(self.endpoints);
        for (node, value) in self.values {
            transport.set_value(node, value);
        }
        for (parent, reference) in self.tree.edges {
            transport.add_reference(parent, reference);
        }
        for node in self.failing_browse {
            transport.fail_browse_of(node);
        }
        transport.set_fail_discovery(self.fail_discovery);
        transport.set_fail_activation(self.fail_activation);
        transport.set_fail_read(self.fail_read);
        transport.set_fail_close(self.fail_close);
        Arc::new(transport)
    }
}

// =============================================================================
// Engines
// =============================================================================

/// Engine over `transport` with in-memory certificates.
pub fn engine(
    transport: &Arc<ScriptedTransport>,
    settings: ClientSettings,
) -> UaEngine<ScriptedTransport> {
    engine_with_provider(transport, settings).0
}

/// Like [`engine`], also returning the certificate provider for inspection.
pub fn engine_with_provider(
    transport: &Arc<ScriptedTransport>,
    settings: ClientSettings,
) -> (UaEngine<ScriptedTransport>, Arc<MemoryCertificateProvider>) {
    let provider = Arc::new(MemoryCertificateProvider::new());
    let security = Arc::new(SecurityContext::new(provider.clone()));
    let engine = UaEngine::new(settings, transport.clone(), security)
        .expect("fixture settings are valid");
    (engine, provider)
}
