#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Versioning strategies seen through full dispatch.

mod common;

use common::fixtures::dispatcher_from;
use http::Method;
use paramgate::request::RequestParts;
use serde_json::json;

const PARAM_API: &str = r#"
version:
  using: param
  versions: [v1]
routes:
  - method: GET
    path: /things
    handler: list_things
    params:
      - { name: x, required: true, type: Integer }
"#;

const HEADER_API: &str = r#"
version:
  using: header
  vendor: acme
  versions: [v1, v2]
  strict: true
routes:
  - { method: GET, path: /things, handler: list_things }
"#;

const CASCADE_API: &str = r#"
routes:
  - method: GET
    path: /things
    handler: things_v2
    version: { using: accept_version_header, versions: [v2] }
  - method: GET
    path: /things
    handler: things_v1
    version: { using: accept_version_header, versions: [v1] }
"#;

#[test]
fn test_param_version_is_stripped_before_validation() {
    let dispatcher = dispatcher_from(PARAM_API);
    let dispatched = dispatcher
        .dispatch(&RequestParts::from_uri(Method::GET, "/things?apiver=v1&x=5"))
        .unwrap();
    assert_eq!(dispatched.version.as_ref().unwrap().version.as_deref(), Some("v1"));
    assert_eq!(dispatched.params, json!({"x": 5}));
    assert_eq!(dispatched.declared(false), json!({"x": 5}));
}

#[test]
fn test_param_version_outside_allow_list_cascades() {
    let dispatcher = dispatcher_from(PARAM_API);
    let error = dispatcher
        .dispatch(&RequestParts::from_uri(Method::GET, "/things?apiver=v9&x=5"))
        .unwrap_err();
    assert_eq!(error.status(), 404);
    assert_eq!(error.body(), json!({"error": "404 API Version Not Found"}));
    assert_eq!(error.headers(), vec![("X-Cascade".to_string(), "pass".to_string())]);
}

#[test]
fn test_vendor_header_selects_version_and_format() {
    let dispatcher = dispatcher_from(HEADER_API);
    let request = RequestParts::new(Method::GET, "/things").with_header("Accept", "application/vnd.acme-v1+json");
    let dispatched = dispatcher.dispatch(&request).unwrap();
    let state = dispatched.version.unwrap();
    assert_eq!(state.version.as_deref(), Some("v1"));
    assert_eq!(state.format.as_deref(), Some("json"));
    assert_eq!(dispatched.format, "json");

    let error = dispatcher.dispatch(&RequestParts::new(Method::GET, "/things")).unwrap_err();
    assert_eq!(error.status(), 406);
    assert_eq!(error.body(), json!({"error": "Accept header must be set."}));
}

#[test]
fn test_rejected_version_falls_through_to_next_route() {
    let dispatcher = dispatcher_from(CASCADE_API);
    let v1 = RequestParts::new(Method::GET, "/things").with_header("Accept-Version", "v1");
    assert_eq!(dispatcher.dispatch(&v1).unwrap().handler(), "things_v1");

    let v2 = RequestParts::new(Method::GET, "/things").with_header("Accept-Version", "v2");
    assert_eq!(dispatcher.dispatch(&v2).unwrap().handler(), "things_v2");

    let v3 = RequestParts::new(Method::GET, "/things").with_header("Accept-Version", "v3");
    assert_eq!(dispatcher.dispatch(&v3).unwrap_err().status(), 404);
}
