use super::*;
use crate::runtime_config::RuntimeConfig;
use clap::Parser;
use serde_json::json;
use std::path::Path;

const API: &str = r#"
routes:
  - method: GET
    path: /items/:id
    handler: show_item
    params:
      - { name: id, required: true, type: Integer }
      - { name: verbose, type: Boolean }
  - { method: POST, path: /items, handler: create_item, params: [{ name: name, required: true }] }
"#;

fn write_definition(dir: &Path) -> String {
    let path = dir.join("api.yaml");
    std::fs::write(&path, API).unwrap();
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str]) -> CommandOutput {
    let cli = Cli::try_parse_from(args).unwrap();
    execute(&cli, &RuntimeConfig::default()).unwrap()
}

#[test]
fn test_check_command_with_flags() {
    let cli = Cli::try_parse_from([
        "paramgate",
        "check",
        "--definition",
        "api.yaml",
        "-m",
        "post",
        "--path",
        "/items",
        "--body",
        "{}",
        "-H",
        "Accept: text/plain",
        "-H",
        "X-Trace: 1",
    ])
    .unwrap();
    match cli.command {
        Commands::Check {
            method, body, headers, ..
        } => {
            assert_eq!(method, "post");
            assert_eq!(body.as_deref(), Some("{}"));
            assert_eq!(headers.len(), 2);
        }
        other => panic!("expected check, got {other:?}"),
    }
}

#[test]
fn test_match_requires_path() {
    assert!(Cli::try_parse_from(["paramgate", "match", "--definition", "api.yaml"]).is_err());
}

#[test]
fn test_routes_lists_table() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let output = run(&["paramgate", "routes", "-d", &definition]);
    assert!(output.success);
    let lines = output.body.as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].as_str().unwrap().ends_with("-> show_item"));
}

#[test]
fn test_match_reports_params_and_405() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    let output = run(&["paramgate", "match", "-d", &definition, "-p", "/items/12"]);
    assert!(output.success);
    assert_eq!(output.body["handler"], "show_item");
    assert_eq!(output.body["path_params"], json!({"id": "12"}));

    let output = run(&["paramgate", "match", "-d", &definition, "-m", "DELETE", "-p", "/items"]);
    assert!(!output.success);
    assert_eq!(output.body, json!({"status": 405, "allowed": ["POST"]}));
}

#[test]
fn test_check_coerces_and_rejects() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    let output = run(&["paramgate", "check", "-d", &definition, "-p", "/items/12?verbose=true"]);
    assert!(output.success);
    assert_eq!(output.body["params"], json!({"id": 12, "verbose": true}));
    assert_eq!(output.body["format"], "json");

    let output = run(&[
        "paramgate", "check", "-d", &definition, "-m", "POST", "-p", "/items", "-b", "{}",
    ]);
    assert!(!output.success);
    assert_eq!(output.body["status"], 400);
    assert_eq!(output.body["body"]["error"], "name is missing");
}

#[test]
fn test_bad_inputs_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let execute_args = |args: &[&str]| execute(&Cli::try_parse_from(args).unwrap(), &RuntimeConfig::default());

    assert!(execute_args(&["paramgate", "check", "-d", &definition, "-p", "/items", "-b", "{nope"]).is_err());
    assert!(execute_args(&["paramgate", "check", "-d", &definition, "-p", "/items", "-H", "no-colon"]).is_err());
    assert!(execute_args(&["paramgate", "routes", "-d", "/does/not/exist.yaml"]).is_err());
}
