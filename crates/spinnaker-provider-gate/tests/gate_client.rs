// crates/spinnaker-provider-gate/tests/gate_client.rs
// ============================================================================
// Module: Gate Client Tests
// Description: HTTP behavior of the Gate transport against a mock server.
// Purpose: Validate task submission, polling, reads, and error mapping.
// Dependencies: spinnaker-provider-gate, spinnaker-provider-core, tiny_http
// ============================================================================

//! ## Overview
//! Tests the Gate client for:
//! - Task submission payloads and reference parsing
//! - Poll decoding, including exception details
//! - Document reads with 404 mapped to absence
//! - An end-to-end delete through [`connect`]

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use spinnaker_provider_config::GateConfig;
use spinnaker_provider_config::ProviderConfig;
use spinnaker_provider_core::ConfigTree;
use spinnaker_provider_core::GatewayError;
use spinnaker_provider_core::RemoteStatus;
use spinnaker_provider_core::ResourceLocator;
use spinnaker_provider_core::ResourceReader;
use spinnaker_provider_core::TaskGateway;
use spinnaker_provider_core::TaskRef;
use spinnaker_provider_core::TaskRequest;
use spinnaker_provider_gate::GateClient;
use spinnaker_provider_gate::connect;

use crate::common::MockGate;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Creates a client for the mock server with one default header.
fn local_client(url: &str) -> GateClient {
    let mut config = GateConfig::new(url);
    config.allow_http = true;
    config.timeout_ms = 5_000;
    config.default_headers = Some("Unit-Test=true".to_string());
    GateClient::new(&config).unwrap()
}

// ============================================================================
// SECTION: Tasks
// ============================================================================

#[test]
fn submit_posts_payload_and_parses_reference() {
    let server = MockGate::serve(vec![(200, r#"{"ref":"/tasks/01ABC"}"#)]);
    let client = local_client(&server.url);
    let request = TaskRequest::new(
        "app",
        "Delete application app",
        ConfigTree::map([("type", ConfigTree::from("deleteApplication"))]),
    );

    let task = client.submit(&request).unwrap();

    assert_eq!(task.id().as_str(), "01ABC");
    let recorded = server.finish();
    assert_eq!(recorded[0].method, "POST");
    assert_eq!(recorded[0].url, "/tasks");
    assert_eq!(ConfigTree::from_json_str(&recorded[0].body).unwrap(), request.to_tree());
    assert_eq!(recorded[0].header("Unit-Test"), Some("true"));
    assert!(recorded[0].header("User-Agent").unwrap().starts_with("spinnaker-provider/"));
}

#[test]
fn submit_without_reference_is_rejected() {
    let server = MockGate::serve(vec![(200, r#"{"id":"x"}"#)]);
    let client = local_client(&server.url);
    let request = TaskRequest::new("app", "noop", ConfigTree::map([("type", ConfigTree::from("noop"))]));
    let err = client.submit(&request).unwrap_err();
    assert!(matches!(err, GatewayError::TaskReference(_)));
    server.finish();
}

#[test]
fn submit_rejection_carries_status() {
    let server = MockGate::serve(vec![(400, "bad job")]);
    let client = local_client(&server.url);
    let request = TaskRequest::new("app", "noop", ConfigTree::map([("type", ConfigTree::from("noop"))]));
    match client.submit(&request).unwrap_err() {
        GatewayError::Status { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("bad job"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.finish();
}

#[test]
fn poll_reads_status_and_exception() {
    let server = MockGate::serve(vec![(
        200,
        r#"{"status":"TERMINAL","execution":{"stages":[{"context":{"exception":{"details":{"errors":["app exists"]}}}}]}}"#,
    )]);
    let client = local_client(&server.url);

    let observation = client.poll(&TaskRef::parse("/tasks/01ABC").unwrap()).unwrap();

    assert_eq!(observation.status, RemoteStatus::Terminal);
    assert_eq!(observation.exception.as_deref(), Some("app exists"));
    assert_eq!(server.finish()[0].url, "/tasks/01ABC");
}

// ============================================================================
// SECTION: Documents
// ============================================================================

#[test]
fn fetch_maps_not_found_to_none() {
    let server = MockGate::serve(vec![(404, "")]);
    let client = local_client(&server.url);
    let locator = ResourceLocator::Pipeline { application: "app".to_string(), name: "deploy".to_string() };
    assert_eq!(client.fetch(&locator).unwrap(), None);
    assert_eq!(server.finish()[0].url, "/applications/app/pipelineConfigs/deploy");
}

#[test]
fn fetch_template_passes_tag_query() {
    let server = MockGate::serve(vec![(200, r#"{"id":"base"}"#)]);
    let client = local_client(&server.url);
    let locator = ResourceLocator::PipelineTemplate { id: "base".to_string(), tag: Some("stable".to_string()) };
    let document = client.fetch(&locator).unwrap().unwrap();
    assert_eq!(document.get_str("id"), Some("base"));
    assert_eq!(server.finish()[0].url, "/v2/pipelineTemplates/base?tag=stable");
}

#[test]
fn fetch_server_error_is_status_error() {
    let server = MockGate::serve(vec![(500, "boom")]);
    let client = local_client(&server.url);
    let err = client.fetch(&ResourceLocator::Applications).unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 500, .. }));
    server.finish();
}

#[test]
fn fetch_invalid_json_is_decode_error() {
    let server = MockGate::serve(vec![(200, "not json")]);
    let client = local_client(&server.url);
    let err = client.fetch(&ResourceLocator::Project { id: "p-1".to_string() }).unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
    server.finish();
}

// ============================================================================
// SECTION: End to End
// ============================================================================

#[test]
fn connect_deletes_application_through_gate() {
    let server = MockGate::serve(vec![
        (200, r#"{"name":"app","attributes":{"name":"app","email":"me@example.com"}}"#),
        (200, r#"{"ref":"/tasks/T1"}"#),
        (200, r#"{"status":"RUNNING"}"#),
        (200, r#"{"status":"SUCCEEDED"}"#),
    ]);
    let config = ProviderConfig::from_toml(&format!(
        "[gate]\nendpoint = \"{}\"\nallow_http = true\n[tasks]\npoll_interval_ms = 10\n",
        server.url
    ))
    .unwrap();

    connect(&config).unwrap().delete_application("app").unwrap();

    let recorded = server.finish();
    let paths: Vec<&str> = recorded.iter().map(|request| request.url.as_str()).collect();
    assert_eq!(paths, vec!["/applications/app", "/tasks", "/tasks/T1", "/tasks/T1"]);
    let body = ConfigTree::from_json_str(&recorded[1].body).unwrap();
    assert_eq!(body.get_str("application"), Some("app"));
}
