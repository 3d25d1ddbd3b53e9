#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Tests for the request pipeline: routing, versioning, format negotiation
//! and parameter validation as one unit.

mod common;

use common::fixtures::store;
use http::Method;
use paramgate::dispatcher::DispatchError;
use paramgate::request::RequestParts;
use serde_json::json;

fn get(uri: &str) -> RequestParts {
    RequestParts::from_uri(Method::GET, uri)
}

fn post(path: &str, body: serde_json::Value) -> RequestParts {
    RequestParts::new(Method::POST, path).with_body(body)
}

#[test]
fn test_query_params_are_coerced_with_defaults() {
    let dispatched = store().dispatch(&get("/api/v1/orders?status=open")).unwrap();
    assert_eq!(dispatched.handler(), "list_orders");
    assert_eq!(dispatched.params, json!({"page": 1, "status": "open"}));
    assert_eq!(dispatched.format, "json");
    assert_eq!(dispatched.version.unwrap().version.as_deref(), Some("v1"));
}

#[test]
fn test_extension_selects_format() {
    let dispatched = store().dispatch(&get("/api/v2/orders.xml")).unwrap();
    assert_eq!(dispatched.format, "xml");

    let error = store().dispatch(&get("/api/v1/orders?format=csv")).unwrap_err();
    assert_eq!(error.status(), 406);
    assert_eq!(
        error.body(),
        json!({"error": "The requested format 'csv' is not supported."})
    );
}

#[test]
fn test_body_with_nested_items_is_coerced() {
    let body = json!({"items": [{"sku": "ABC-1", "quantity": "2"}], "coupon": "SPRING"});
    let dispatched = store().dispatch(&post("/api/v2/orders", body)).unwrap();
    assert_eq!(dispatched.handler(), "create_order");
    assert_eq!(dispatched.params["items"], json!([{"sku": "ABC-1", "quantity": 2}]));
}

#[test]
fn test_validation_failures_are_collected() {
    let body = json!({
        "items": [{"sku": "bad", "quantity": "0"}, {}],
        "coupon": "SPRING",
        "gift_card": "G-1",
    });
    let error = store().dispatch(&post("/api/v1/orders", body)).unwrap_err();
    assert_eq!(error.status(), 400);

    let DispatchError::Validation(errors) = &error else {
        panic!("expected validation errors, got {error:?}");
    };
    let mut messages = errors.full_messages();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "coupon, gift_card are mutually exclusive",
            "items[0][quantity] does not have a valid value",
            "items[0][sku] is invalid",
            "items[1][quantity] is missing",
            "items[1][sku] is missing",
        ]
    );
    assert_eq!(error.body()["details"].as_array().unwrap().len(), 5);
}

#[test]
fn test_method_not_allowed_lists_allow_header() {
    let error = store().dispatch(&RequestParts::new(Method::PUT, "/api/v1/orders")).unwrap_err();
    assert_eq!(error.status(), 405);
    assert_eq!(error.headers(), vec![("Allow".to_string(), "GET, HEAD, POST".to_string())]);
}

#[test]
fn test_unknown_path_and_version_are_not_found() {
    let error = store().dispatch(&get("/api/v1/customers")).unwrap_err();
    assert!(matches!(error, DispatchError::NotFound));
    assert_eq!(error.headers(), vec![("X-Cascade".to_string(), "pass".to_string())]);

    let error = store().dispatch(&get("/api/v3/orders")).unwrap_err();
    assert_eq!(error.status(), 404);
    assert!(matches!(error, DispatchError::Version(_)));
}

#[test]
fn test_head_and_method_override() {
    let dispatched = store()
        .dispatch(&RequestParts::new(Method::HEAD, "/api/v1/orders/5"))
        .unwrap();
    assert_eq!(dispatched.handler(), "show_order");
    assert_eq!(dispatched.declared(false), json!({"id": 5}));

    let request = RequestParts::new(Method::POST, "/api/v1/orders/5").with_header("X-HTTP-Method-Override", "delete");
    let dispatched = store().dispatch(&request).unwrap();
    assert_eq!(dispatched.handler(), "cancel_order");
    assert_eq!(dispatched.params, json!({"id": "5"}));
}
