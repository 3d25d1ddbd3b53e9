#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::fixtures::STORE_API;
use common::temp_files::{create_temp_json, create_temp_yaml};
use http::Method;
use paramgate::definition::{load_definition, load_dispatcher};
use paramgate::request::RequestParts;
use paramgate::runtime_config::RuntimeConfig;
use serde_json::json;

#[test]
fn test_yaml_definition_round_trips_into_dispatcher() {
    let file = create_temp_yaml(STORE_API);
    let dispatcher = load_dispatcher(file.path(), &RuntimeConfig::default()).unwrap();
    assert_eq!(dispatcher.router().len(), 4);
    let sources: Vec<String> = dispatcher
        .router()
        .routes()
        .iter()
        .map(|r| r.pattern().origin().to_string())
        .collect();
    assert!(sources.contains(&"/api/:version/orders/:id".to_string()));
}

#[test]
fn test_json_definition_with_forward_match_and_metadata() {
    let file = create_temp_json(
        r#"{
            "mount_path": "/mnt",
            "routes": [
                {
                    "method": "GET",
                    "path": "/assets",
                    "handler": "assets",
                    "forward_match": true,
                    "metadata": {"cache": "long"}
                }
            ]
        }"#,
    );
    let dispatcher = load_dispatcher(file.path(), &RuntimeConfig::default()).unwrap();
    let dispatched = dispatcher
        .dispatch(&RequestParts::from_uri(Method::GET, "/mnt/assets/css/site"))
        .unwrap();
    assert_eq!(dispatched.handler(), "assets");
    assert_eq!(dispatched.route.metadata().get("cache"), Some(&json!("long")));
}

#[test]
fn test_placeholder_switch_in_definition() {
    let file = create_temp_yaml(
        r#"
empty_array_placeholder: true
routes:
  - method: POST
    path: /batch
    handler: batch
    params:
      - name: items
        required: true
        type: Array
        params:
          - { name: key, required: true }
"#,
    );
    let dispatcher = load_dispatcher(file.path(), &RuntimeConfig::default()).unwrap();
    let request = RequestParts::new(Method::POST, "/batch").with_body(json!({"items": []}));
    let error = dispatcher.dispatch(&request).unwrap_err();
    assert_eq!(error.to_string(), "items[0][key] is missing");
}

#[test]
fn test_malformed_definitions_report_the_file() {
    let file = create_temp_yaml("routes: [ { method: GET");
    let error = load_definition(file.path()).unwrap_err();
    assert!(error.to_string().starts_with("invalid YAML in"));

    let file = create_temp_yaml("routes:\n  - { method: GET, path: '/a/:', handler: a }\n");
    let error = load_dispatcher(file.path(), &RuntimeConfig::default()).unwrap_err();
    assert!(error.to_string().starts_with("invalid API definition"));
}
