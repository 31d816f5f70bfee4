//! Overview Generation Tests
//!
//! End-to-end runs of the aggregator over the fixture projects in
//! `tests/fixtures` and a few throwaway projects built in temp dirs.

use std::fs;
use std::path::{Path, PathBuf};

use synapse_overview::{
    ArtifactKind, ArtifactLocator, EntrypointType, OverviewAggregator, OverviewConfig, OverviewModel,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn generate(root: &Path) -> OverviewModel {
    OverviewAggregator::default().generate(root).unwrap()
}

fn ids(model: &OverviewModel, entrypoint: &str) -> Vec<String> {
    model
        .entrypoint(entrypoint)
        .unwrap_or_else(|| panic!("missing entrypoint {}", entrypoint))
        .connection_ids
        .clone()
}

// =============================================================================
// Shared connector across an API and a task
// =============================================================================

#[test]
fn test_shared_connector_is_one_connection() {
    let model = generate(&fixture("scenario"));

    assert_eq!(model.project_name, "scenario");
    assert_eq!(model.connections.len(), 1);
    assert_eq!(model.connections[0].id, "1");
    assert_eq!(model.connections[0].name, "http.get");
    assert_eq!(model.connections[0].path, None);

    assert_eq!(model.entrypoints.len(), 2);
    let order = model.entrypoint("Order").unwrap();
    assert_eq!(order.entrypoint_type, EntrypointType::Service);
    assert_eq!(order.connection_ids, vec!["1"]);

    let cleanup = model.entrypoint("Cleanup").unwrap();
    assert_eq!(cleanup.entrypoint_type, EntrypointType::ScheduledTask);
    assert_eq!(cleanup.connection_ids, vec!["1"]);
}

#[test]
fn test_scenario_json_shape() {
    let json = serde_json::to_value(generate(&fixture("scenario"))).unwrap();

    assert_eq!(
        json["connections"],
        serde_json::json!([{ "id": "1", "name": "http.get", "path": null }])
    );
    assert_eq!(json["entrypoints"][0]["type"], "SERVICE");
    assert_eq!(json["entrypoints"][0]["connectionIds"], serde_json::json!(["1"]));
    assert_eq!(json["entrypoints"][1]["type"], "SCHEDULED_TASK");
}

// =============================================================================
// Full project
// =============================================================================

#[test]
fn test_shop_entrypoints_in_discovery_order() {
    let model = generate(&fixture("shop"));

    let names: Vec<&str> = model.entrypoints.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Broken", "Order", "Cleanup", "FileWatcher"]);

    let ids: Vec<&str> = model.entrypoints.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);

    let types: Vec<EntrypointType> = model.entrypoints.iter().map(|e| e.entrypoint_type).collect();
    assert_eq!(
        types,
        vec![
            EntrypointType::Service,
            EntrypointType::Service,
            EntrypointType::ScheduledTask,
            EntrypointType::Trigger,
        ]
    );
}

#[test]
fn test_shop_connections_are_deduplicated() {
    let model = generate(&fixture("shop"));

    let names: Vec<&str> = model.connections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["http.post", "email.send", "salesforce.query", "http.get"]);

    // email.send is reached through a template and a fault sequence, once each
    assert_eq!(ids(&model, "Order"), vec!["1", "2"]);
    assert_eq!(ids(&model, "Cleanup"), vec!["3", "4"]);
    assert_eq!(ids(&model, "FileWatcher"), vec!["1", "2"]);
}

#[test]
fn test_unparsable_entrypoint_degrades() {
    let model = generate(&fixture("shop"));

    let broken = model.entrypoint("Broken").unwrap();
    assert_eq!(broken.entrypoint_type, EntrypointType::Service);
    assert!(broken.connection_ids.is_empty());
    assert!(broken.path.ends_with("Broken.xml"));
}

#[test]
fn test_sequence_in_task_dir_is_not_an_entrypoint() {
    let model = generate(&fixture("shop"));

    assert!(model.entrypoint("Stray").is_none());
    assert!(model.connections.iter().all(|c| c.name != "kafka.publish"));
}

#[test]
fn test_registered_connector_has_path() {
    let root = fixture("shop");
    let model = generate(&root);

    let email = model.connections.iter().find(|c| c.name == "email.send").unwrap();
    assert_eq!(email.path.as_deref().map(Path::new), Some(root.join("connectors/email").as_path()));

    let http = model.connections.iter().find(|c| c.name == "http.post").unwrap();
    assert_eq!(http.path, None);
}

#[test]
fn test_generation_is_idempotent() {
    let root = fixture("shop");
    let aggregator = OverviewAggregator::default();

    let first = aggregator.generate(&root).unwrap();
    let second = aggregator.generate(&root).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Dependency trees
// =============================================================================

#[test]
fn test_api_tree_follows_references() {
    let root = fixture("shop");
    let tree = OverviewAggregator::default().tree(&root, &root.join("api/Order.xml"));

    assert_eq!(tree.name.as_deref(), Some("Order"));
    assert_eq!(tree.kind, ArtifactKind::Api);

    let names = |kind| -> Vec<String> {
        tree.collect_kind(kind)
            .into_iter()
            .filter_map(|d| d.name.clone())
            .collect()
    };
    assert_eq!(names(ArtifactKind::Sequence), vec!["Validate", "Fault"]);
    assert_eq!(names(ArtifactKind::Template), vec!["Notify"]);
    assert_eq!(names(ArtifactKind::Endpoint), vec!["Inventory"]);
    assert_eq!(names(ArtifactKind::MessageStore), vec!["OrderStore"]);

    // Missing key is dropped
    assert!(!tree.render().contains("DoesNotExist"));
}

#[test]
fn test_self_referencing_sequence_terminates() {
    let root = fixture("shop");
    let tree = OverviewAggregator::default().tree(&root, &root.join("sequences/Loop.xml"));

    assert_eq!(tree.name.as_deref(), Some("Loop"));
    assert_eq!(tree.children.len(), 2);
    assert_eq!(tree.children[0].name.as_deref(), Some("Loop"));
    assert!(tree.children[0].children.is_empty());
    assert_eq!(tree.children[1].name.as_deref(), Some("http.post"));
}

#[test]
fn test_mutually_recursive_project() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "api/Ping.xml",
        r#"<api name="Ping" context="/ping"><resource inSequence="A"/></api>"#,
    );
    write(dir.path(), "sequences/A.xml", r#"<sequence name="A"><sequence key="B"/><http.get/></sequence>"#);
    write(dir.path(), "sequences/B.xml", r#"<sequence name="B"><sequence key="A"/><email.send/></sequence>"#);

    let model = generate(dir.path());
    assert_eq!(model.entrypoints.len(), 1);

    let names: Vec<&str> = model.connections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["email.send", "http.get"]);
    assert_eq!(ids(&model, "Ping"), vec!["1", "2"]);
}

#[test]
fn test_cycle_entered_from_either_end() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "api/A.xml", r#"<api name="A"><resource inSequence="Pong"/></api>"#);
    write(dir.path(), "api/B.xml", r#"<api name="B"><resource inSequence="Ping"/></api>"#);
    write(dir.path(), "sequences/Ping.xml", r#"<sequence name="Ping"><sequence key="Pong"/><http.get/></sequence>"#);
    write(dir.path(), "sequences/Pong.xml", r#"<sequence name="Pong"><sequence key="Ping"/><email.send/></sequence>"#);

    let model = generate(dir.path());

    let names: Vec<&str> = model.connections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["http.get", "email.send"]);
    // B reaches Pong only through the placeholder left when A cut the cycle
    assert_eq!(ids(&model, "A"), vec!["1", "2"]);
    assert_eq!(ids(&model, "B"), vec!["1", "2"]);
}

#[test]
fn test_discovered_sequence_is_never_an_entrypoint() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "api/Order.xml",
        r#"<api name="Order"><resource><inSequence><sequence key="Validate"/></inSequence></resource></api>"#,
    );
    write(dir.path(), "sequences/Validate.xml", r#"<sequence name="Validate"><http.get/></sequence>"#);
    write(dir.path(), "sequences/Audit.xml", r#"<sequence name="Audit"><email.send/></sequence>"#);

    // Let the finder offer sequences as candidates too
    let mut config = OverviewConfig::default();
    config.scan.entrypoint_kinds.push(ArtifactKind::Sequence);

    let model = OverviewAggregator::new(config).generate(dir.path()).unwrap();

    let names: Vec<&str> = model.entrypoints.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Order"]);
    assert_eq!(model.connections.len(), 1);
    assert_eq!(model.connections[0].name, "http.get");
    assert_eq!(ids(&model, "Order"), vec!["1"]);
}

// =============================================================================
// Layout variations
// =============================================================================

#[test]
fn test_nested_artifact_root() {
    let dir = tempfile::tempdir().unwrap();
    let base = "src/main/wso2mi/artifacts";
    write(
        dir.path(),
        &format!("{}/apis/Stock.xml", base),
        r#"<api name="Stock" context="/stock"><resource><inSequence><sequence key="Lookup"/></inSequence></resource></api>"#,
    );
    write(
        dir.path(),
        &format!("{}/sequences/Lookup.xml", base),
        r#"<sequence name="Lookup"><db.select/></sequence>"#,
    );

    let mut config = OverviewConfig::default();
    config.layout.directories.insert("api".to_string(), "apis".to_string());

    let model = OverviewAggregator::new(config).generate(dir.path()).unwrap();
    assert_eq!(model.entrypoints.len(), 1);
    assert_eq!(model.connections.len(), 1);
    assert_eq!(model.connections[0].name, "db.select");
}

#[test]
fn test_connector_archive_registration() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "tasks/Sync.xml", r#"<task name="Sync"><salesforce.query/></task>"#);
    write(dir.path(), "connectors/salesforce-connector-2.1.0.zip", "PK");

    let model = generate(dir.path());
    let path = model.connections[0].path.as_deref().unwrap();
    assert!(path.ends_with("salesforce-connector-2.1.0.zip"));
}

#[test]
fn test_empty_project() {
    let dir = tempfile::tempdir().unwrap();
    let model = generate(dir.path());

    assert!(model.entrypoints.is_empty());
    assert!(model.connections.is_empty());
}

#[test]
fn test_locator_finds_fixture_keys() {
    let root = fixture("shop");
    let locator = ArtifactLocator::default();

    assert_eq!(
        locator.locate("Notify", ArtifactKind::Template, &root),
        Some(root.join("templates/Notify.xml"))
    );
    assert_eq!(locator.locate("Notify", ArtifactKind::Sequence, &root), None);
    assert!(locator
        .suggest("Validat", ArtifactKind::Sequence, &root, 3)
        .contains(&"Validate".to_string()));
}
