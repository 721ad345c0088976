// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built endpoints, address-space trees and settings.

use chrono::{DateTime, TimeZone, Utc};
use uafetch_opcua::{
    ClientSettings, Endpoint, ExpandedNodeId, NodeId, ReferenceDescription, SecurityMode,
    SecurityPolicy, TimeoutSettings, UrlMatch,
};

// =============================================================================
// Tree
// =============================================================================

/// An address-space script: `(parent, child)` edges in reference order.
#[derive(Debug, Clone, Default)]
pub struct TreeFixture {
    /// Edges, in the order the server returns them per parent.
    pub edges: Vec<(NodeId, ReferenceDescription)>,
}

impl TreeFixture {
    /// Adds a local child.
    pub fn child(mut self, parent: NodeId, child: NodeId) -> Self {
        let name = child.to_string();
        self.edges
            .push((parent, ReferenceDescription::to_node(child, name)));
        self
    }

    /// Adds a raw reference.
    pub fn reference(mut self, parent: NodeId, reference: ReferenceDescription) -> Self {
        self.edges.push((parent, reference));
        self
    }

    /// Children of `parent`, in order.
    pub fn children_of(&self, parent: &NodeId) -> Vec<ExpandedNodeId> {
        self.edges
            .iter()
            .filter(|(p, _)| p == parent)
            .map(|(_, r)| r.node_id.clone())
            .collect()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Shared fixture constructors.
pub struct Fixtures;

impl Fixtures {
    /// Configured server URL.
    pub const URL: &'static str = "opc.tcp://host:4840";

    /// Another server's URL, advertised alongside [`Fixtures::URL`].
    pub const OTHER_URL: &'static str = "opc.tcp://other-host:4840";

    /// Canned server timestamp.
    pub fn server_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap() + chrono::Duration::milliseconds(250)
    }

    /// Canned server timestamp in output form.
    pub const SERVER_TIMESTAMP_TEXT: &'static str = "2024-03-15T08:00:00.250Z";

    /// One endpoint per policy at `url`, plus decoys at [`Fixtures::OTHER_URL`].
    pub fn all_policy_endpoints(url: &str) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();
        for policy in SecurityPolicy::ALL {
            endpoints.push(Endpoint::new(Self::OTHER_URL, policy, mode_for(policy)));
        }
        for policy in SecurityPolicy::ALL {
            let mut endpoint = Endpoint::new(url, policy, mode_for(policy));
            endpoint.security_level = security_level(policy);
            endpoints.push(endpoint);
        }
        endpoints
    }

    /// Endpoints at `url` offering only `policy`.
    pub fn single_policy_endpoints(url: &str, policy: SecurityPolicy) -> Vec<Endpoint> {
        vec![Endpoint::new(url, policy, mode_for(policy))]
    }

    /// Settings for [`Fixtures::URL`] with short timeouts.
    pub fn settings(policy: Option<SecurityPolicy>) -> ClientSettings {
        let mut settings = ClientSettings::new(Self::URL);
        settings.security_policy = policy;
        settings.application_name = "uafetch-test".to_string();
        settings.url_match = UrlMatch::Exact;
        settings.timeouts = TimeoutSettings::uniform(std::time::Duration::from_secs(2));
        settings
    }

    /// Root `i=84` with children A and B; A has A1, A2; B has B1.
    pub fn two_level_tree() -> TreeFixture {
        let root = NodeId::root_folder();
        TreeFixture::default()
            .child(root.clone(), Self::node("A"))
            .child(root, Self::node("B"))
            .child(Self::node("A"), Self::node("A1"))
            .child(Self::node("A"), Self::node("A2"))
            .child(Self::node("B"), Self::node("B1"))
    }

    /// Every node below `root` has `branching` children, `depth` levels deep.
    ///
    /// Child names extend the parent's: `N.0`, `N.0.1`, ...
    pub fn uniform_tree(root: NodeId, branching: usize, depth: usize) -> TreeFixture {
        fn grow(
            tree: TreeFixture,
            parent: NodeId,
            prefix: &str,
            branching: usize,
            remaining: usize,
        ) -> TreeFixture {
            if remaining == 0 {
                return tree;
            }
            let mut tree = tree;
            for i in 0..branching {
                let name = format!("{}.{}", prefix, i);
                let child = NodeId::string(1, name.clone());
                tree = tree.child(parent.clone(), child.clone());
                tree = grow(tree, child, &name, branching, remaining - 1);
            }
            tree
        }

        grow(TreeFixture::default(), root, "N", branching, depth)
    }

    /// String node in namespace 2.
    pub fn node(name: &str) -> NodeId {
        NodeId::string(2, name)
    }
}

fn mode_for(policy: SecurityPolicy) -> SecurityMode {
    if policy.requires_certificates() {
        SecurityMode::SignAndEncrypt
    } else {
        SecurityMode::None
    }
}

fn security_level(policy: SecurityPolicy) -> u8 {
    match policy {
        SecurityPolicy::None => 0,
        SecurityPolicy::Basic128Rsa15 => 1,
        SecurityPolicy::Basic256 => 2,
        SecurityPolicy::Basic256Rsa256 => 3,
    }
}

/// Nodes of a uniform tree within `levels`, `sum(b^i for i in 1..=levels)`.
pub fn uniform_node_count(branching: usize, levels: usize) -> usize {
    (1..=levels).map(|level| branching.pow(level as u32)).sum()
}
