// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Read Integration Tests
//!
//! - `test_fetch_*`: single-value reads through the engine
//! - `test_session_*`: session lifecycle around failures

use std::time::Duration;

use uafetch_opcua::client::DEFAULT_MAX_AGE;
use uafetch_opcua::format::format_read;
use uafetch_opcua::{
    ClientIdentity, DataValue, OpcUaError, Outcome, SecurityMaterial, SecurityPolicy,
    SessionManager, SessionState, TimeoutSettings, TimestampsToReturn, Variant,
};
use uafetch_tests::common::{
    engine, engine_with_provider, init_test_logging, Fixtures, TransportBuilder,
};

fn failure(outcome: Outcome) -> (OpcUaError, String) {
    match outcome {
        Outcome::Failure { error, input } => (error, input),
        Outcome::Success { output } => panic!("expected failure, got {:?}", output),
    }
}

// =============================================================================
// Formatting
// =============================================================================

#[test]
fn test_format_read_record() {
    let out = format_read(
        "ns=2;s=Temperature",
        &Variant::Double(42.5),
        Some(&Fixtures::server_timestamp()),
    );
    assert_eq!(out, format!("ns=2;s=Temperature,42.5,{}", Fixtures::SERVER_TIMESTAMP_TEXT));
}

// =============================================================================
// Fetch
// =============================================================================

#[tokio::test]
async fn test_fetch_renders_tag_value_timestamp() {
    init_test_logging();
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("Temperature"), 42.5)
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let outcome = engine.fetch("ns=2;s=Temperature").await;

    assert_eq!(
        outcome.output(),
        Some("ns=2;s=Temperature,42.5,2024-03-15T08:00:00.250Z")
    );
    assert_eq!(transport.calls().read(), 1);
    assert_eq!(transport.open_channel_count(), 0);
}

#[tokio::test]
async fn test_fetch_sends_value_request_with_max_age() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("Pressure"), 1013_i32)
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    assert!(engine.fetch("ns=2;s=Pressure").await.is_success());

    let requests = transport.read_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_age, DEFAULT_MAX_AGE);
    assert_eq!(requests[0].max_age, 500.0);
    assert_eq!(requests[0].timestamps_to_return, TimestampsToReturn::Both);
    assert_eq!(requests[0].nodes_to_read.len(), 1);
    assert_eq!(requests[0].nodes_to_read[0].node_id, Fixtures::node("Pressure"));
}

#[tokio::test]
async fn test_fetch_missing_timestamp_renders_null() {
    let mut value = DataValue::new("idle", Fixtures::server_timestamp());
    value.server_timestamp = None;
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .data_value(Fixtures::node("State"), value)
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let outcome = engine.fetch("ns=2;s=State").await;

    assert_eq!(outcome.output(), Some("ns=2;s=State,idle,null"));
}

#[tokio::test]
async fn test_fetch_keeps_tag_text_verbatim() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("Level"), 7_i32)
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let outcome = engine.fetch("ns=2;s=Level").await;

    assert!(outcome.output().unwrap().starts_with("ns=2;s=Level,7,"));
}

#[tokio::test]
async fn test_fetch_invalid_tag_fails_without_io() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let (error, input) = failure(engine.fetch("ns=x;s=Broken").await);

    assert!(matches!(error, OpcUaError::Configuration(_)));
    assert_eq!(input, "ns=x;s=Broken");
    assert_eq!(transport.calls().discover(), 0);
}

#[tokio::test]
async fn test_fetch_read_fault_preserves_input() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .fail_read()
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let (error, input) = failure(engine.fetch("ns=2;s=Temperature").await);

    assert!(matches!(error, OpcUaError::Read(_)));
    assert_eq!(input, "ns=2;s=Temperature");
    assert_eq!(transport.calls().close(), 1);
    assert_eq!(transport.open_channel_count(), 0);
}

#[tokio::test]
async fn test_fetch_discovery_failure_opens_no_channel() {
    let transport = TransportBuilder::new().fail_discovery().build();
    let (engine, provider) =
        engine_with_provider(&transport, Fixtures::settings(Some(SecurityPolicy::Basic256)));

    let (error, _) = failure(engine.fetch("ns=2;s=Temperature").await);

    assert!(matches!(error, OpcUaError::Discovery(_)));
    assert_eq!(transport.calls().create_channel(), 0);
    // Certificates resolve before discovery.
    assert!(provider.generated_count() >= 1);
    assert!(provider.generated_count() <= 2);
}

#[tokio::test]
async fn test_fetch_activation_failure_closes_half_open_channel() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("Temperature"), 42.5)
        .fail_activation()
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let (error, _) = failure(engine.fetch("ns=2;s=Temperature").await);

    assert!(matches!(error, OpcUaError::Session(_)));
    assert_eq!(transport.calls().create_channel(), 1);
    assert_eq!(transport.calls().read(), 0);
    assert_eq!(transport.calls().close(), 1);
    assert_eq!(transport.open_channel_count(), 0);
    assert_eq!(engine.session_stats().activation_failures(), 1);
}

#[tokio::test]
async fn test_fetch_close_failure_keeps_success() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("Temperature"), 42.5)
        .fail_close()
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let outcome = engine.fetch("ns=2;s=Temperature").await;

    assert!(outcome.is_success());
    assert_eq!(engine.session_stats().close_failures(), 1);
}

#[tokio::test]
async fn test_fetch_unknown_node_renders_null_value() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .build();
    let engine = engine(&transport, Fixtures::settings(None));

    let outcome = engine.fetch("ns=2;s=Missing").await;

    assert_eq!(outcome.output(), Some("ns=2;s=Missing,null,null"));
}

#[tokio::test]
async fn test_fetch_concurrent_invocations_use_own_sessions() {
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("A"), 1_i32)
        .value(Fixtures::node("B"), 2_i32)
        .build();
    let engine = engine(&transport, Fixtures::settings(Some(SecurityPolicy::Basic128Rsa15)));

    let (a, b) = tokio::join!(engine.fetch("ns=2;s=A"), engine.fetch("ns=2;s=B"));

    assert!(a.output().unwrap().starts_with("ns=2;s=A,1,"));
    assert!(b.output().unwrap().starts_with("ns=2;s=B,2,"));
    assert_eq!(transport.calls().create_channel(), 2);
    assert_eq!(transport.open_channel_count(), 0);
    // Single-flight: one load per certificate slot.
    assert_eq!(engine.security().stats().loads(), 2);
}

// =============================================================================
// Sessions
// =============================================================================

fn no_certificates() -> SecurityMaterial {
    SecurityMaterial::NoCertificateNeeded { https: None }
}

#[tokio::test]
async fn test_session_close_is_idempotent() {
    let transport = TransportBuilder::new().build();
    let manager = SessionManager::new(
        transport.clone(),
        ClientIdentity::for_application("uafetch-test"),
        TimeoutSettings::uniform(Duration::from_secs(2)),
    );
    let endpoint = Fixtures::single_policy_endpoints(Fixtures::URL, SecurityPolicy::None).remove(0);

    let mut session = manager.open(&endpoint, &no_certificates()).await.unwrap();
    assert_eq!(session.state(), SessionState::Activated);
    assert_eq!(transport.open_channel_count(), 1);

    manager.close(&mut session).await.unwrap();
    manager.close(&mut session).await.unwrap();

    assert_eq!(session.state(), SessionState::Closed);
    assert_eq!(transport.calls().close(), 1);
    assert_eq!(manager.stats().closed(), 1);
}

#[tokio::test]
async fn test_session_with_session_closes_on_error() {
    let transport = TransportBuilder::new().build();
    let manager = SessionManager::new(
        transport.clone(),
        ClientIdentity::for_application("uafetch-test"),
        TimeoutSettings::uniform(Duration::from_secs(2)),
    );
    let endpoint = Fixtures::single_policy_endpoints(Fixtures::URL, SecurityPolicy::None).remove(0);

    let result: Result<(), OpcUaError> = manager
        .with_session(&endpoint, &no_certificates(), |_session| async {
            Err(OpcUaError::invalid_node_id("x", "scripted"))
        })
        .await;

    assert!(result.is_err());
    assert_eq!(transport.calls().close(), 1);
    assert_eq!(transport.open_channel_count(), 0);
}
