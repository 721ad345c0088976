// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Host Integration Tests
//!
//! Configuration file to routed output, with a scripted server behind the
//! command layer.

use std::sync::Arc;

use uafetch_bin::cli::{BrowseArgs, OutputFormat};
use uafetch_bin::commands::{effective_browse_settings, render_endpoints, run_browse, run_read};
use uafetch_bin::{engine_with_transport, BinError, OutputSink};
use uafetch_config::{ConfigLoader, HostConfig};
use uafetch_opcua::{Endpoint, OpcUaError, UaTransport};
use uafetch_tests::common::{
    init_test_logging, temp_test_dir, Fixtures, ScriptedTransport, TransportBuilder,
};

const CONFIG: &str = r#"
client:
  endpoint_url: opc.tcp://host:4840
  security_policy: None
  application_name: uafetch-host-test
  pki_dir: ./pki
browse:
  max_recursive_depth: 2
  print_indentation: true
output_target: out/result.txt
"#;

fn load(prefix: &str) -> (tempfile::TempDir, HostConfig) {
    let dir = temp_test_dir("uafetch-host");
    let path = dir.path().join("uafetch.yaml");
    std::fs::write(&path, CONFIG).unwrap();
    let config = ConfigLoader::builder().env_prefix(prefix).build().load(&path).unwrap();
    (dir, config)
}

fn scripted() -> Arc<ScriptedTransport> {
    TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .value(Fixtures::node("Temperature"), 42.5)
        .tree(Fixtures::two_level_tree())
        .build()
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_resolves_relative_paths() {
    let (dir, config) = load("UAFETCH_HOST_PATHS");

    assert_eq!(config.client.endpoint_url, Fixtures::URL);
    assert_eq!(config.client.pki_dir, dir.path().join("./pki"));
    assert_eq!(config.output_target, Some(dir.path().join("out/result.txt")));
}

#[test]
fn test_browse_flags_override_file() {
    let (_dir, config) = load("UAFETCH_HOST_FLAGS");

    let from_file = effective_browse_settings(&config, &BrowseArgs::default()).unwrap();
    assert_eq!(from_file.max_recursive_depth, 2);
    assert!(from_file.print_indentation);

    let args = BrowseArgs {
        start: Some("ns=2;s=A".into()),
        depth: Some(1),
        ..BrowseArgs::default()
    };
    let overridden = effective_browse_settings(&config, &args).unwrap();
    assert_eq!(overridden.max_recursive_depth, 1);
    assert_eq!(overridden.starting_node.as_deref(), Some("ns=2;s=A"));
}

#[test]
fn test_browse_depth_required_without_section() {
    let (_dir, mut config) = load("UAFETCH_HOST_DEPTH");
    config.browse = None;

    let err = effective_browse_settings(&config, &BrowseArgs::default()).unwrap_err();
    assert_eq!(err.exit_code(), 1);
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_read_routes_record_to_output_target() {
    init_test_logging();
    let (_dir, config) = load("UAFETCH_HOST_READ");
    let transport = scripted();
    let engine = engine_with_transport(&config, transport.clone() as Arc<dyn UaTransport>).unwrap();
    let sink = OutputSink::from_target(config.output_target.as_deref());

    run_read(&engine, "ns=2;s=Temperature", &sink).await.unwrap();

    let written = std::fs::read_to_string(config.output_target.unwrap()).unwrap();
    assert_eq!(
        written,
        format!("ns=2;s=Temperature,42.5,{}\n", Fixtures::SERVER_TIMESTAMP_TEXT)
    );
    assert_eq!(transport.open_channel_count(), 0);
}

#[tokio::test]
async fn test_browse_routes_tree_to_output_target() {
    let (_dir, config) = load("UAFETCH_HOST_BROWSE");
    let transport = scripted();
    let engine = engine_with_transport(&config, transport.clone() as Arc<dyn UaTransport>).unwrap();
    let sink = OutputSink::from_target(config.output_target.as_deref());
    let settings = effective_browse_settings(&config, &BrowseArgs::default()).unwrap();

    run_browse(&engine, &settings, &sink).await.unwrap();

    let written = std::fs::read_to_string(config.output_target.unwrap()).unwrap();
    assert_eq!(
        written,
        "- ns=2;s=A\n- - ns=2;s=A1\n- - ns=2;s=A2\n- ns=2;s=B\n- - ns=2;s=B1\n"
    );
}

#[tokio::test]
async fn test_read_failure_routes_input_to_failure() {
    let (_dir, config) = load("UAFETCH_HOST_FAILURE");
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::URL))
        .fail_read()
        .build();
    let engine = engine_with_transport(&config, transport as Arc<dyn UaTransport>).unwrap();
    let target = config.output_target.clone().unwrap();
    let sink = OutputSink::from_target(Some(target.as_path()));

    let err = run_read(&engine, "ns=2;s=Temperature", &sink).await.unwrap_err();

    assert_eq!(err.exit_code(), 3);
    match err {
        BinError::Operation { input, source } => {
            assert_eq!(input, "ns=2;s=Temperature");
            assert!(matches!(source, OpcUaError::Read(_)));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(!target.exists());
}

#[tokio::test]
async fn test_no_matching_endpoint_is_an_operation_failure() {
    let (_dir, config) = load("UAFETCH_HOST_NO_ENDPOINT");
    let transport = TransportBuilder::new()
        .endpoints(Fixtures::all_policy_endpoints(Fixtures::OTHER_URL))
        .build();
    let engine = engine_with_transport(&config, transport.clone() as Arc<dyn UaTransport>).unwrap();

    let err = run_read(&engine, "ns=2;s=Temperature", &OutputSink::Stdout)
        .await
        .unwrap_err();

    assert_eq!(err.exit_code(), 3);
    assert_eq!(transport.calls().create_channel(), 0);
}

#[tokio::test]
async fn test_endpoints_render_as_json() {
    let (_dir, config) = load("UAFETCH_HOST_ENDPOINTS");
    let transport = scripted();
    let engine = engine_with_transport(&config, transport as Arc<dyn UaTransport>).unwrap();

    let endpoints = engine.list_endpoints().await.unwrap();
    let json = render_endpoints(&endpoints, OutputFormat::Json).unwrap();
    let decoded: Vec<Endpoint> = serde_json::from_str(&json).unwrap();

    assert_eq!(decoded, endpoints);
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[4]["url"], Fixtures::URL);
}
