// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Timeout Integration Tests
//!
//! A server that never answers must surface as the error kind of the call
//! that was waiting. Time is paused, so the timers expire instantly.

use std::sync::Arc;
use std::time::Duration;

use uafetch_opcua::{
    BranchFailurePolicy, BrowseError, ClientIdentity, CloseError, DepthLimitPolicy,
    DiscoveryError, NodeId, NodeTreeBrowser, OpcUaError, Outcome, ReadError, SecurityMaterial,
    SecurityPolicy, SessionError, SessionManager, TimeoutSettings,
};
use uafetch_tests::common::{engine, Fixtures, ScriptedTransport, Stage, TransportBuilder};

fn scripted() -> Arc<ScriptedTransport> {
    TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("Temperature"), 42.5)
        .tree(Fixtures::two_level_tree())
        .build()
}

fn failure(outcome: Outcome) -> OpcUaError {
    match outcome {
        Outcome::Failure { error, .. } => error,
        Outcome::Success { output } => panic!("expected failure, got {:?}", output),
    }
}

fn sessions(transport: &Arc<ScriptedTransport>) -> SessionManager<ScriptedTransport> {
    SessionManager::new(
        transport.clone(),
        ClientIdentity::for_application("uafetch-test"),
        TimeoutSettings::uniform(Duration::from_secs(2)),
    )
}

fn no_certificates() -> SecurityMaterial {
    SecurityMaterial::NoCertificateNeeded { https: None }
}

#[tokio::test(start_paused = true)]
async fn test_hung_discovery_is_a_discovery_timeout() {
    let transport = scripted();
    transport.hang(Stage::Discovery);
    let engine = engine(&transport, Fixtures::settings(None));

    let error = failure(engine.fetch("ns=2;s=Temperature").await);

    assert!(matches!(error, OpcUaError::Discovery(DiscoveryError::TimedOut { .. })));
    assert!(error.is_retryable());
    assert_eq!(transport.calls().create_channel(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hung_activation_is_a_session_timeout() {
    let transport = scripted();
    transport.hang(Stage::Activation);
    let engine = engine(&transport, Fixtures::settings(None));

    let error = failure(engine.fetch("ns=2;s=Temperature").await);

    assert!(matches!(error, OpcUaError::Session(SessionError::TimedOut { .. })));
    assert_eq!(transport.calls().read(), 0);
    assert_eq!(transport.calls().close(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_read_is_a_read_timeout() {
    let transport = scripted();
    transport.hang(Stage::Read);
    let engine = engine(&transport, Fixtures::settings(None));

    let error = failure(engine.fetch("ns=2;s=Temperature").await);

    assert!(matches!(error, OpcUaError::Read(ReadError::TimedOut { .. })));
    assert_eq!(transport.calls().close(), 1);
    assert_eq!(transport.open_channel_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_hung_close_is_a_close_timeout() {
    let transport = scripted();
    transport.hang(Stage::Close);
    let manager = sessions(&transport);
    let endpoint =
        Fixtures::single_policy_endpoints(Fixtures::URL, SecurityPolicy::None).remove(0);

    let mut session = manager.open(&endpoint, &no_certificates()).await.unwrap();
    let err = manager.close(&mut session).await.unwrap_err();

    assert!(matches!(err, CloseError::TimedOut { .. }));
    assert_eq!(manager.stats().close_failures(), 1);
    // Closed locally even though the server never confirmed.
    assert!(manager.close(&mut session).await.is_ok());
    assert_eq!(transport.calls().close(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_close_keeps_fetch_success() {
    let transport = scripted();
    transport.hang(Stage::Close);
    let engine = engine(&transport, Fixtures::settings(None));

    let outcome = engine.fetch("ns=2;s=Temperature").await;

    assert!(outcome.is_success());
    assert_eq!(engine.session_stats().close_failures(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_hung_subtree_is_recorded_and_skipped() {
    let transport = scripted();
    transport.hang_browse_of(Fixtures::node("A"));
    let manager = sessions(&transport);
    let endpoint =
        Fixtures::single_policy_endpoints(Fixtures::URL, SecurityPolicy::None).remove(0);
    let session = manager.open(&endpoint, &no_certificates()).await.unwrap();
    let browser = NodeTreeBrowser::new(transport.clone(), Duration::from_secs(2));

    let report = browser
        .browse(
            &session,
            &NodeId::root_folder(),
            3,
            DepthLimitPolicy::SkipSubtree,
            BranchFailurePolicy::BestEffort,
        )
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].node, Fixtures::node("A"));
    assert!(matches!(report.failures[0].error, BrowseError::TimedOut { .. }));
    let listed: Vec<String> = report.lines.iter().map(|l| l.node.to_string()).collect();
    assert_eq!(listed, vec!["ns=2;s=A", "ns=2;s=B", "ns=2;s=B1"]);
}

#[tokio::test(start_paused = true)]
async fn test_hung_start_node_fails_browse() {
    let transport = scripted();
    transport.hang_browse_of(NodeId::root_folder());
    let engine = engine(&transport, Fixtures::settings(None));

    let error = failure(engine.browse_tree(&uafetch_opcua::BrowseSettings::new(2)).await);

    assert!(matches!(error, OpcUaError::Browse(BrowseError::TimedOut { .. })));
    assert_eq!(transport.open_channel_count(), 0);
}
