// crates/spinnaker-provider-core/tests/resources.rs
// ============================================================================
// Module: Resource Operation Tests
// Description: Task payloads, read-back, drift, and not-found handling.
// Purpose: Exercise every resource lifecycle against a scripted gateway.
// ============================================================================
//! ## Overview
//! Each test scripts the gateway's documents and poll results, runs one
//! resource operation, and inspects the submitted task payloads.

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

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use common::FakeGate;
use common::tree;
use spinnaker_provider_core::Action;
use spinnaker_provider_core::Application;
use spinnaker_provider_core::ConfigTree;
use spinnaker_provider_core::ManualClock;
use spinnaker_provider_core::Project;
use spinnaker_provider_core::ResourceClient;
use spinnaker_provider_core::ResourceError;
use spinnaker_provider_core::ResourceKind;
use spinnaker_provider_core::ResourceLocator;
use spinnaker_provider_core::TaskError;
use spinnaker_provider_core::TaskPolicy;
use spinnaker_provider_core::TaskTracker;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a resource client over `gate` with a virtual clock.
fn client(gate: &FakeGate) -> ResourceClient<&FakeGate, ManualClock> {
    ResourceClient::new(TaskTracker::new(gate, TaskPolicy::default()).with_clock(ManualClock::new()))
}

/// Returns the single job of the `index`-th submitted task.
fn job(gate: &FakeGate, index: usize) -> ConfigTree {
    gate.submitted()[index].job[0].clone()
}

/// Decodes a base64 JSON job field.
fn decode(field: &ConfigTree) -> ConfigTree {
    let bytes = STANDARD.decode(field.as_str().unwrap()).unwrap();
    ConfigTree::from_json_slice(&bytes).unwrap()
}

/// Registers an application with the given pipelines.
fn seed_pipelines(gate: &FakeGate, application: &str, pipelines: &str) {
    gate.put(ResourceLocator::Pipelines { application: application.to_string() }, tree(pipelines));
}

/// Standalone pipeline definition.
const PIPELINE: &str = r#"{"application":"app","name":"deploy","stages":[],"triggers":[]}"#;

/// Pipeline template definition.
const TEMPLATE: &str = r#"{
    "id": "base",
    "schema": "v2",
    "metadata": {"name": "Base", "description": "d", "owner": "me@example.com", "scopes": ["global"]},
    "pipeline": {"stages": [], "triggers": []}
}"#;

// ============================================================================
// SECTION: Applications
// ============================================================================

#[test]
fn create_application_submits_action_indexed_document() {
    let gate = FakeGate::succeeding();
    gate.put_json(
        ResourceLocator::Application { name: "app".to_string() },
        r#"{"name":"app","attributes":{"name":"app","email":"me@example.com","cloudProviders":"aws,kubernetes",
            "permissions":{"READ":["ops","dev"],"WRITE":["ops"]}}}"#,
    );
    let mut application = Application::new("app", "me@example.com");
    application.cloud_providers = vec!["aws".to_string(), "kubernetes".to_string()];
    application.permissions.grant("ops", Action::Read);
    application.permissions.grant("ops", Action::Write);
    application.permissions.grant("dev", Action::Read);

    let stored = client(&gate).create_application(&application).unwrap();

    assert_eq!(stored.cloud_providers, vec!["aws", "kubernetes"]);
    assert_eq!(stored.permissions.pairs(), application.permissions.pairs());
    let request = &gate.submitted()[0];
    assert_eq!(request.application, "app");
    assert_eq!(request.description, "Create application app");
    let job = job(&gate, 0);
    assert_eq!(job.get_str("type"), Some("createApplication"));
    let document = job.get("application").unwrap();
    assert_eq!(document.get_str("cloudProviders"), Some("aws,kubernetes"));
    assert_eq!(document.get("permissions").unwrap(), &tree(r#"{"READ":["ops","dev"],"WRITE":["ops"]}"#));
}

#[test]
fn actionless_roles_leave_permissions_out() {
    let gate = FakeGate::succeeding();
    gate.put_json(
        ResourceLocator::Application { name: "app".to_string() },
        r#"{"name":"app","attributes":{"name":"app","email":"me@example.com","cloudProviders":""}}"#,
    );
    let mut application = Application::new("app", "me@example.com");
    application.permissions = [("ops", Vec::new())].into_iter().collect();

    let stored = client(&gate).create_application(&application).unwrap();

    assert!(stored.permissions.is_empty());
    let document = job(&gate, 0).get("application").unwrap().clone();
    assert!(document.get("permissions").is_none());
}

#[test]
fn invalid_application_fails_before_submission() {
    let gate = FakeGate::succeeding();
    let err = client(&gate).create_application(&Application::new("Bad Name", "me@example.com")).unwrap_err();
    assert!(matches!(err, ResourceError::Attribute(_)));
    assert!(gate.submitted().is_empty());
}

#[test]
fn empty_cloud_providers_decode_to_empty_list() {
    let application =
        Application::from_document(&tree(r#"{"name":"app","email":"me@example.com","cloudProviders":""}"#)).unwrap();
    assert!(application.cloud_providers.is_empty());
}

#[test]
fn delete_missing_application_is_not_found() {
    let gate = FakeGate::succeeding();
    let err = client(&gate).delete_application("ghost").unwrap_err();
    assert_eq!(err, ResourceError::NotFound { kind: ResourceKind::Application, identifier: "ghost".to_string() });
    assert!(gate.submitted().is_empty());
}

#[test]
fn failed_task_surfaces_verbatim() {
    let gate = FakeGate::default();
    gate.script_statuses(&["RUNNING", "TERMINAL"]);
    let err = client(&gate).create_application(&Application::new("app", "me@example.com")).unwrap_err();
    assert!(matches!(err, ResourceError::Task(TaskError::TaskFailed { .. })));
}

// ============================================================================
// SECTION: Projects
// ============================================================================

#[test]
fn upsert_project_reads_back_by_name_and_detects_drift() {
    let gate = FakeGate::succeeding();
    gate.put_json(
        ResourceLocator::Project { id: "proj".to_string() },
        r#"{"id":"p-1","name":"proj","config":{"applications":["other"],"clusters":[],"pipelineConfigs":[]}}"#,
    );
    let mut project = Project::new("proj", "me@example.com");
    project.config = tree(r#"{"applications":["app"],"clusters":[],"pipelineConfigs":[]}"#);

    let state = client(&gate).upsert_project(&project).unwrap();

    assert_eq!(state.id, "p-1");
    let drift = state.drift.unwrap();
    assert_eq!(drift.path_desired, "config.applications[0]");
    let job = job(&gate, 0);
    assert_eq!(job.get_str("type"), Some("upsertProject"));
    assert_eq!(job.get_str("user"), Some("me@example.com"));
    assert_eq!(gate.submitted()[0].description, "Create project proj");
}

#[test]
fn delete_project_targets_id() {
    let gate = FakeGate::succeeding();
    gate.put_json(ResourceLocator::Project { id: "p-1".to_string() }, r#"{"id":"p-1","name":"proj"}"#);
    client(&gate).delete_project("p-1").unwrap();
    assert_eq!(job(&gate, 0), tree(r#"{"type":"deleteProject","project":{"id":"p-1"}}"#));
}

// ============================================================================
// SECTION: Pipelines
// ============================================================================

#[test]
fn save_pipeline_encodes_definition() {
    let gate = FakeGate::succeeding();
    gate.put_json(
        ResourceLocator::Pipeline { application: "app".to_string(), name: "deploy".to_string() },
        r#"{"id":"pipe-1","application":"app","name":"deploy","stages":[],"triggers":[],"updateTs":"1"}"#,
    );

    let state = client(&gate).create_pipeline(&tree(PIPELINE)).unwrap();

    assert_eq!(state.id, "pipe-1");
    assert!(state.drift.is_none());
    let job = job(&gate, 0);
    assert_eq!(job.get_str("type"), Some("savePipeline"));
    assert_eq!(job.get_str("application"), Some("app"));
    assert_eq!(decode(job.get("pipeline").unwrap()), tree(PIPELINE));
}

#[test]
fn templated_pipeline_is_typed_and_update_sets_id() {
    let gate = FakeGate::succeeding();
    gate.put_json(
        ResourceLocator::Pipeline { application: "app".to_string(), name: "deploy".to_string() },
        r#"{"id":"pipe-1","application":"app","name":"deploy"}"#,
    );
    let definition = tree(
        r#"{"application":"app","name":"deploy","stages":[],"triggers":[],
            "template":{"artifactAccount":"front50ArtifactCredentials","reference":"spinnaker://base","type":"front50/pipelineTemplate"},
            "variables":{},"metadata":{"name":"deploy","description":"d","scopes":["global"]}}"#,
    );

    client(&gate).update_pipeline("pipe-1", &definition).unwrap();

    let sent = decode(job(&gate, 0).get("pipeline").unwrap());
    assert_eq!(sent.get_str("type"), Some("templatedPipeline"));
    assert_eq!(sent.get_str("id"), Some("pipe-1"));
    assert_eq!(gate.submitted()[0].description, "Update pipeline deploy");
}

#[test]
fn incomplete_templated_pipeline_is_not_saved_as_standalone() {
    let gate = FakeGate::succeeding();
    let definition = tree(
        r#"{"application":"app","name":"deploy","stages":[],"triggers":[],
            "template":{"artifactAccount":"front50ArtifactCredentials","reference":"spinnaker://base","type":"front50/pipelineTemplate"}}"#,
    );

    let err = client(&gate).create_pipeline(&definition).unwrap_err();

    let ResourceError::Validation(err) = err else { panic!("expected validation error, got {err:?}") };
    assert_eq!(err.variant(), Some("templatedPipeline"));
    assert_eq!(err.path(), "pipeline.definition.metadata");
    assert!(gate.submitted().is_empty());
}

#[test]
fn read_pipeline_scans_applications_for_id() {
    let gate = FakeGate::default();
    gate.put_json(ResourceLocator::Applications, r#"[{"name":"first"},{"name":"app"}]"#);
    seed_pipelines(&gate, "first", r#"[{"id":"other","name":"x"}]"#);
    seed_pipelines(&gate, "app", r#"[{"id":"pipe-1","name":"deploy"}]"#);
    gate.put_json(
        ResourceLocator::Pipeline { application: "app".to_string(), name: "deploy".to_string() },
        r#"{"id":"pipe-1","application":"app","name":"renamed","stages":[],"triggers":[]}"#,
    );

    let state = client(&gate).read_pipeline("pipe-1", Some(&tree(PIPELINE))).unwrap();

    assert_eq!(state.definition.get_str("name"), Some("renamed"));
    assert_eq!(state.drift.unwrap().path_desired, "definition.name");
}

#[test]
fn unknown_pipeline_id_is_not_found() {
    let gate = FakeGate::default();
    gate.put_json(ResourceLocator::Applications, r#"[{"name":"app"}]"#);
    seed_pipelines(&gate, "app", r#"[{"id":"pipe-1","name":"deploy"}]"#);
    let err = client(&gate).read_pipeline("missing", None).unwrap_err();
    assert_eq!(err, ResourceError::NotFound { kind: ResourceKind::Pipeline, identifier: "missing".to_string() });
}

#[test]
fn delete_pipeline_addresses_application_and_name() {
    let gate = FakeGate::succeeding();
    gate.put_json(ResourceLocator::Applications, r#"[{"name":"app"}]"#);
    seed_pipelines(&gate, "app", r#"[{"id":"pipe-1","name":"deploy"}]"#);
    client(&gate).delete_pipeline("pipe-1").unwrap();
    assert_eq!(
        job(&gate, 0),
        tree(r#"{"type":"deletePipeline","pipeline":{"application":"app","name":"deploy"}}"#)
    );
}

// ============================================================================
// SECTION: Pipeline Templates
// ============================================================================

#[test]
fn create_template_runs_under_spinnaker_and_strips_managed_fields() {
    let gate = FakeGate::succeeding();
    let mut stored = tree(TEMPLATE);
    stored = stored.with_entry("updateTs", ConfigTree::from("1700000000"));
    stored = stored.with_entry("lastModifiedBy", ConfigTree::from("me"));
    gate.put(ResourceLocator::PipelineTemplate { id: "base".to_string(), tag: Some("stable".to_string()) }, stored);

    let state = client(&gate).create_pipeline_template(&tree(TEMPLATE), Some("stable")).unwrap();

    assert_eq!(state.result, tree(TEMPLATE));
    assert!(state.drift.is_none());
    let request = &gate.submitted()[0];
    assert_eq!(request.application, "spinnaker");
    let job = job(&gate, 0);
    assert_eq!(job.get_str("type"), Some("createV2PipelineTemplate"));
    assert_eq!(job.get_str("tag"), Some("stable"));
    assert_eq!(decode(job.get("pipelineTemplate").unwrap()), tree(TEMPLATE));
}

#[test]
fn unsupported_tag_is_rejected_before_submission() {
    let gate = FakeGate::succeeding();
    let err = client(&gate).create_pipeline_template(&tree(TEMPLATE), Some("nightly")).unwrap_err();
    assert!(matches!(err, ResourceError::Attribute(_)));
    assert!(gate.submitted().is_empty());
}

#[test]
fn delete_template_omits_absent_tag() {
    let gate = FakeGate::succeeding();
    client(&gate).delete_pipeline_template("base", None).unwrap();
    assert_eq!(job(&gate, 0), tree(r#"{"type":"deleteV2PipelineTemplate","id":"base"}"#));
}
