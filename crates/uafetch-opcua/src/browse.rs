// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Depth-bounded recursive browsing of the server address space.
//!
//! # Traversal
//!
//! The start node is visited at depth 1. Visiting a node at depth `d`:
//!
//! ```text
//! Visit(node, d)
//!   browse(node, Forward)
//!     fault ─► start node / FailFast ────► Err(BrowseError)
//!           └► BestEffort ───────────────► record failure, Continue
//!   d > max:
//!     no references ─────────────────────► Continue (nothing cut off)
//!     references ────────────────────────► DepthExceeded (none emitted)
//!   for each reference r (server order):
//!     emit TreeLine { depth: d, node: r }
//!     Visit(r, d + 1)
//!       DepthExceeded + AbortTraversal ──► DepthExceeded (stop everything)
//!       otherwise ───────────────────────► next reference
//!   ──────────────────────────────────────► Continue
//! ```
//!
//! A node one level past the bound is browsed once so a leaf at the bound
//! does not count as exceedance. A fault on that request is logged and
//! ignored, since none of its references would be listed. A bound of 0
//! lists nothing and sends no request.
//!
//! Output is depth-first pre-order. Depth travels as a parameter, so nothing
//! carries over between traversals. There is no visited set: a cyclic graph
//! is revisited until the depth bound stops it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::client::{BrowseDescription, ReferenceDescription, Session, UaTransport};
use crate::config::{BranchFailurePolicy, BrowseSettings, DepthLimitPolicy};
use crate::error::{BrowseError, OpcUaError, OpcUaResult};
use crate::types::{ExpandedNodeId, NodeId};

// =============================================================================
// Report types
// =============================================================================

/// One output line of a traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeLine {
    /// Depth of the reference; children of the start node are at depth 1.
    pub depth: usize,
    /// Referenced node.
    pub node: ExpandedNodeId,
}

/// A subtree that could not be browsed.
#[derive(Debug)]
pub struct BranchFailure {
    /// Node whose browse failed.
    pub node: NodeId,
    /// Depth at which it was visited.
    pub depth: usize,
    /// The failure.
    pub error: BrowseError,
}

/// Result of one traversal.
#[derive(Debug, Default)]
pub struct BrowseReport {
    /// Lines in pre-order.
    pub lines: Vec<TreeLine>,
    /// Browse requests that succeeded.
    pub nodes_browsed: usize,
    /// `true` if the depth bound cut off any subtree.
    pub depth_exceeded: bool,
    /// `true` if the traversal stopped early under [`DepthLimitPolicy::AbortTraversal`].
    pub aborted: bool,
    /// Subtrees skipped after a failure.
    pub failures: Vec<BranchFailure>,
}

impl BrowseReport {
    /// Returns `true` if every visited node was browsed.
    pub fn is_complete(&self) -> bool {
        !self.aborted && self.failures.is_empty()
    }
}

/// What a visit tells its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Keep iterating siblings.
    Continue,
    /// The depth bound was hit.
    DepthExceeded,
}

// =============================================================================
// NodeTreeBrowser
// =============================================================================

type VisitFuture<'a> = Pin<Box<dyn Future<Output = OpcUaResult<VisitOutcome>> + Send + 'a>>;

struct Traversal {
    max_depth: usize,
    depth_policy: DepthLimitPolicy,
    failure_policy: BranchFailurePolicy,
    report: BrowseReport,
}

/// Recursive browser over an active session.
pub struct NodeTreeBrowser<T: UaTransport + ?Sized> {
    transport: Arc<T>,
    timeout: Duration,
}

impl<T: UaTransport + ?Sized> NodeTreeBrowser<T> {
    /// Creates a browser. `timeout` bounds each browse request.
    pub fn new(transport: Arc<T>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Browses from the configured start node.
    pub async fn browse_with(&self, session: &Session, settings: &BrowseSettings) -> OpcUaResult<BrowseReport> {
        let start = settings.start_node()?;
        self.browse(
            session,
            &start,
            settings.max_recursive_depth,
            settings.depth_limit_policy,
            settings.branch_failure_policy,
        )
        .await
    }

    /// Browses from `start` down to `max_depth` levels.
    pub async fn browse(
        &self,
        session: &Session,
        start: &NodeId,
        max_depth: usize,
        depth_policy: DepthLimitPolicy,
        failure_policy: BranchFailurePolicy,
    ) -> OpcUaResult<BrowseReport> {
        session.ensure_active()?;

        let mut traversal = Traversal {
            max_depth,
            depth_policy,
            failure_policy,
            report: BrowseReport::default(),
        };

        tracing::debug!(node_id = %start, max_depth, "Starting browse");

        if max_depth == 0 {
            tracing::debug!(node_id = %start, "Depth bound is 0, nothing to list");
            return Ok(traversal.report);
        }

        if let VisitOutcome::DepthExceeded = self.visit(session, start.clone(), 1, &mut traversal).await? {
            traversal.report.depth_exceeded = true;
            if depth_policy == DepthLimitPolicy::AbortTraversal {
                traversal.report.aborted = true;
            }
        }

        let report = traversal.report;
        if report.aborted {
            OpcUaError::from(BrowseError::depth_exceeded(max_depth + 1, max_depth)).log("browse");
        }
        tracing::info!(
            node_id = %start,
            lines = report.lines.len(),
            nodes_browsed = report.nodes_browsed,
            failures = report.failures.len(),
            depth_exceeded = report.depth_exceeded,
            "Browse finished"
        );
        Ok(report)
    }

    fn visit<'a>(
        &'a self,
        session: &'a Session,
        node: NodeId,
        depth: usize,
        traversal: &'a mut Traversal,
    ) -> VisitFuture<'a> {
        Box::pin(async move {
            if depth > traversal.max_depth {
                return Ok(self.inspect_beyond_bound(session, &node, depth, traversal).await);
            }

            let references = match self.browse_node(session, &node).await {
                Ok(references) => references,
                Err(error) => {
                    if depth == 1 || traversal.failure_policy == BranchFailurePolicy::FailFast {
                        return Err(error.into());
                    }
                    tracing::warn!(node_id = %node, depth, error = %error, "Skipping subtree");
                    traversal.report.failures.push(BranchFailure { node, depth, error });
                    return Ok(VisitOutcome::Continue);
                }
            };
            traversal.report.nodes_browsed += 1;

            for reference in references {
                traversal.report.lines.push(TreeLine {
                    depth,
                    node: reference.node_id.clone(),
                });

                let Some(child) = reference.node_id.local_node_id() else {
                    tracing::debug!(node_id = %reference.node_id, "Not descending into non-local reference");
                    continue;
                };

                match self.visit(session, child.clone(), depth + 1, traversal).await? {
                    VisitOutcome::Continue => {}
                    VisitOutcome::DepthExceeded => {
                        traversal.report.depth_exceeded = true;
                        if traversal.depth_policy == DepthLimitPolicy::AbortTraversal {
                            traversal.report.aborted = true;
                            return Ok(VisitOutcome::DepthExceeded);
                        }
                    }
                }
            }

            Ok(VisitOutcome::Continue)
        })
    }

    /// Browses a node one level past the bound without listing anything.
    async fn inspect_beyond_bound(
        &self,
        session: &Session,
        node: &NodeId,
        depth: usize,
        traversal: &mut Traversal,
    ) -> VisitOutcome {
        match self.browse_node(session, node).await {
            Ok(references) => {
                traversal.report.nodes_browsed += 1;
                if references.is_empty() {
                    VisitOutcome::Continue
                } else {
                    tracing::debug!(node_id = %node, depth, cut = references.len(), "Depth bound cuts off references");
                    VisitOutcome::DepthExceeded
                }
            }
            Err(error) => {
                tracing::debug!(node_id = %node, depth, error = %error, "Node past the depth bound not inspected");
                VisitOutcome::Continue
            }
        }
    }

    async fn browse_node(
        &self,
        session: &Session,
        node: &NodeId,
    ) -> Result<Vec<ReferenceDescription>, BrowseError> {
        let description = BrowseDescription::forward(node.clone());
        match tokio::time::timeout(self.timeout, self.transport.browse(session.channel(), &description)).await {
            Ok(Ok(references)) => Ok(references),
            Ok(Err(fault)) => Err(BrowseError::faulted(node.to_string(), fault)),
            Err(_) => Err(BrowseError::timed_out(node.to_string(), self.timeout)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificate::SecurityMaterial;
    use crate::client::{ChannelId, ClientIdentity, DataValue, Endpoint, ReadRequest, SessionManager};
    use crate::config::TimeoutSettings;
    use crate::error::ServiceFault;
    use crate::types::{SecurityMode, SecurityPolicy};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TreeTransport {
        children: HashMap<NodeId, Vec<NodeId>>,
        faulty: HashSet<NodeId>,
        hanging: HashSet<NodeId>,
        requests: AtomicUsize,
    }

    impl TreeTransport {
        fn edge(mut self, parent: NodeId, children: &[NodeId]) -> Self {
            self.children.insert(parent, children.to_vec());
            self
        }

        fn fault(mut self, node: NodeId) -> Self {
            self.faulty.insert(node);
            self
        }

        fn hang(mut self, node: NodeId) -> Self {
            self.hanging.insert(node);
            self
        }
    }

    #[async_trait]
    impl UaTransport for TreeTransport {
        async fn discover_endpoints(
            &self,
            _url: &str,
            _identity: &ClientIdentity,
        ) -> Result<Vec<Endpoint>, ServiceFault> {
            Ok(vec![])
        }

        async fn create_channel(
            &self,
            _endpoint: &Endpoint,
            _material: &SecurityMaterial,
            _identity: &ClientIdentity,
        ) -> Result<ChannelId, ServiceFault> {
            Ok(ChannelId(1))
        }

        async fn activate_session(&self, _channel: ChannelId) -> Result<(), ServiceFault> {
            Ok(())
        }

        async fn read(
            &self,
            _channel: ChannelId,
            _request: &ReadRequest,
        ) -> Result<Vec<DataValue>, ServiceFault> {
            Ok(vec![])
        }

        async fn browse(
            &self,
            _channel: ChannelId,
            description: &BrowseDescription,
        ) -> Result<Vec<ReferenceDescription>, ServiceFault> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.hanging.contains(&description.node_id) {
                std::future::pending::<()>().await;
            }
            if self.faulty.contains(&description.node_id) {
                return Err(ServiceFault::communication("browse refused"));
            }
            Ok(self
                .children
                .get(&description.node_id)
                .map(|children| {
                    children
                        .iter()
                        .map(|c| ReferenceDescription::to_node(c.clone(), c.to_string()))
                        .collect()
                })
                .unwrap_or_default())
        }

        async fn close_channel(&self, _channel: ChannelId) -> Result<(), ServiceFault> {
            Ok(())
        }

        fn display_name(&self) -> String {
            "tree".into()
        }
    }

    fn n(name: &str) -> NodeId {
        NodeId::string(1, name)
    }

    async fn run(
        transport: TreeTransport,
        max_depth: usize,
        depth_policy: DepthLimitPolicy,
        failure_policy: BranchFailurePolicy,
    ) -> (Arc<TreeTransport>, OpcUaResult<BrowseReport>) {
        let transport = Arc::new(transport);
        let sessions = SessionManager::new(
            transport.clone(),
            ClientIdentity::for_application("test"),
            TimeoutSettings::default(),
        );
        let endpoint = Endpoint::new("opc.tcp://host:4840", SecurityPolicy::None, SecurityMode::None);
        let session = sessions
            .open(&endpoint, &SecurityMaterial::NoCertificateNeeded { https: None })
            .await
            .unwrap();
        let browser = NodeTreeBrowser::new(transport.clone(), Duration::from_secs(1));
        let result = browser
            .browse(&session, &NodeId::root_folder(), max_depth, depth_policy, failure_policy)
            .await;
        (transport, result)
    }

    fn names(report: &BrowseReport) -> Vec<(usize, String)> {
        report
            .lines
            .iter()
            .map(|l| (l.depth, l.node.to_string()))
            .collect()
    }

    fn sample() -> TreeTransport {
        TreeTransport::default()
            .edge(NodeId::root_folder(), &[n("A"), n("B")])
            .edge(n("A"), &[n("A1"), n("A2")])
            .edge(n("B"), &[n("B1")])
            .edge(n("A1"), &[n("A1x")])
    }

    #[tokio::test]
    async fn test_depth_one_lists_direct_children() {
        let (transport, result) =
            run(sample(), 1, DepthLimitPolicy::SkipSubtree, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert_eq!(names(&report), vec![(1, "ns=1;s=A".into()), (1, "ns=1;s=B".into())]);
        assert!(report.depth_exceeded);
        assert!(!report.aborted);
        // Root, then A and B to see whether anything lies past the bound.
        assert_eq!(transport.requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_preorder() {
        let (_, result) =
            run(sample(), 5, DepthLimitPolicy::SkipSubtree, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert_eq!(
            names(&report),
            vec![
                (1, "ns=1;s=A".into()),
                (2, "ns=1;s=A1".into()),
                (3, "ns=1;s=A1x".into()),
                (2, "ns=1;s=A2".into()),
                (1, "ns=1;s=B".into()),
                (2, "ns=1;s=B1".into()),
            ]
        );
        assert!(!report.depth_exceeded);
        assert_eq!(report.nodes_browsed, 7);
    }

    #[tokio::test]
    async fn test_zero_depth_makes_no_request() {
        let (transport, result) =
            run(sample(), 0, DepthLimitPolicy::SkipSubtree, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert!(report.lines.is_empty());
        assert_eq!(transport.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_start_node() {
        let (_, result) = run(
            TreeTransport::default(),
            3,
            DepthLimitPolicy::SkipSubtree,
            BranchFailurePolicy::BestEffort,
        )
        .await;
        let report = result.unwrap();
        assert!(report.lines.is_empty());
        assert_eq!(report.nodes_browsed, 1);
    }

    #[tokio::test]
    async fn test_abort_stops_everything() {
        let (_, result) =
            run(sample(), 1, DepthLimitPolicy::AbortTraversal, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert_eq!(names(&report), vec![(1, "ns=1;s=A".into())]);
        assert!(report.aborted);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_best_effort_skips_failed_branch() {
        let (_, result) = run(
            sample().fault(n("A")),
            5,
            DepthLimitPolicy::SkipSubtree,
            BranchFailurePolicy::BestEffort,
        )
        .await;
        let report = result.unwrap();

        assert_eq!(
            names(&report),
            vec![
                (1, "ns=1;s=A".into()),
                (1, "ns=1;s=B".into()),
                (2, "ns=1;s=B1".into()),
            ]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].node, n("A"));
        assert_eq!(report.failures[0].depth, 2);
    }

    #[tokio::test]
    async fn test_fail_fast() {
        let (_, result) = run(
            sample().fault(n("A")),
            5,
            DepthLimitPolicy::SkipSubtree,
            BranchFailurePolicy::FailFast,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            OpcUaError::Browse(BrowseError::Faulted { .. })
        ));
    }

    #[tokio::test]
    async fn test_start_node_failure_always_fails() {
        let (_, result) = run(
            sample().fault(NodeId::root_folder()),
            5,
            DepthLimitPolicy::SkipSubtree,
            BranchFailurePolicy::BestEffort,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cycle_is_bounded_by_depth() {
        let transport = TreeTransport::default()
            .edge(NodeId::root_folder(), &[n("Loop")])
            .edge(n("Loop"), &[n("Loop")]);
        let (transport, result) =
            run(transport, 4, DepthLimitPolicy::SkipSubtree, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert_eq!(report.lines.len(), 4);
        assert_eq!(transport.requests.load(Ordering::SeqCst), 5);
        assert!(report.depth_exceeded);
    }

    fn leaves() -> TreeTransport {
        TreeTransport::default().edge(NodeId::root_folder(), &[n("A"), n("B")])
    }

    #[tokio::test]
    async fn test_leaf_at_bound_is_not_exceedance() {
        let (transport, result) =
            run(leaves(), 1, DepthLimitPolicy::SkipSubtree, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert_eq!(names(&report), vec![(1, "ns=1;s=A".into()), (1, "ns=1;s=B".into())]);
        assert!(!report.depth_exceeded);
        assert_eq!(transport.requests.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_abort_keeps_siblings_when_bound_ends_at_leaves() {
        let (_, result) =
            run(leaves(), 1, DepthLimitPolicy::AbortTraversal, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert_eq!(names(&report), vec![(1, "ns=1;s=A".into()), (1, "ns=1;s=B".into())]);
        assert!(!report.depth_exceeded);
        assert!(!report.aborted);
        assert!(report.is_complete());
    }

    #[tokio::test]
    async fn test_abort_at_first_node_with_content_past_bound() {
        let transport = TreeTransport::default()
            .edge(NodeId::root_folder(), &[n("A"), n("B"), n("C")])
            .edge(n("B"), &[n("B1")]);
        let (_, result) =
            run(transport, 1, DepthLimitPolicy::AbortTraversal, BranchFailurePolicy::BestEffort).await;
        let report = result.unwrap();

        assert_eq!(names(&report), vec![(1, "ns=1;s=A".into()), (1, "ns=1;s=B".into())]);
        assert!(report.depth_exceeded);
        assert!(report.aborted);
    }

    #[tokio::test]
    async fn test_fault_past_bound_is_ignored() {
        let (_, result) = run(
            leaves().fault(n("A")),
            1,
            DepthLimitPolicy::AbortTraversal,
            BranchFailurePolicy::FailFast,
        )
        .await;
        let report = result.unwrap();

        assert_eq!(report.lines.len(), 2);
        assert!(report.failures.is_empty());
        assert!(!report.aborted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_subtree_times_out_and_is_skipped() {
        let (_, result) = run(
            sample().hang(n("A")),
            5,
            DepthLimitPolicy::SkipSubtree,
            BranchFailurePolicy::BestEffort,
        )
        .await;
        let report = result.unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].node, n("A"));
        assert!(matches!(report.failures[0].error, BrowseError::TimedOut { .. }));
        assert_eq!(
            names(&report),
            vec![
                (1, "ns=1;s=A".into()),
                (1, "ns=1;s=B".into()),
                (2, "ns=1;s=B1".into()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_start_node_times_out() {
        let (_, result) = run(
            sample().hang(NodeId::root_folder()),
            2,
            DepthLimitPolicy::SkipSubtree,
            BranchFailurePolicy::BestEffort,
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            OpcUaError::Browse(BrowseError::TimedOut { .. })
        ));
    }
}
