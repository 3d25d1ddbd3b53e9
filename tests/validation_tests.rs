#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end checks of parameter contracts through the public API.

use paramgate::coerce::TypeDescriptor;
use paramgate::validations::{Dependency, ParamDecl, ParamsTree, ValidationErrors, ValidationOptions, ValueSet};
use serde_json::{json, Value};
use std::sync::Arc;
use std::thread;

fn messages(result: Result<Value, ValidationErrors>) -> Vec<String> {
    result.err().map(|e| e.full_messages()).unwrap_or_default()
}

fn order_tree() -> ParamsTree {
    ParamsTree::build(|root| {
        root.requires("customer", ParamDecl::new())?;
        root.requires_group("items", ParamDecl::of(TypeDescriptor::array()), |items| {
            items.requires("key", ParamDecl::new())?;
            items.optional("qty", ParamDecl::of(TypeDescriptor::integer()).default_value(1))?;
            Ok(())
        })?;
        root.optional("a", ParamDecl::new())?
            .optional("b", ParamDecl::new())?
            .optional("c", ParamDecl::new())?
            .mutually_exclusive(&["a", "b", "c"])?;
        Ok(())
    })
    .unwrap()
}

#[test]
fn test_presence_reports_exactly_the_missing_field() {
    let tree = order_tree();
    assert_eq!(
        messages(tree.validate(json!({"items": []}))),
        vec!["customer is missing"]
    );
    assert!(tree.validate(json!({"customer": "c", "items": []})).is_ok());
}

#[test]
fn test_coercion_failure_is_the_only_error() {
    let tree = ParamsTree::build(|root| {
        root.requires(
            "level",
            ParamDecl::of(TypeDescriptor::integer()).values(ValueSet::list([1, 2, 3])),
        )?;
        Ok(())
    })
    .unwrap();
    assert_eq!(messages(tree.validate(json!({"level": "high"}))), vec!["level is invalid"]);
    assert_eq!(tree.validate(json!({"level": "3"})).unwrap(), json!({"level": 3}));
}

#[test]
fn test_nested_index_and_array_presence() {
    let tree = order_tree();
    assert_eq!(
        messages(tree.validate(json!({"customer": "c", "items": [{"key": "a"}, {}]}))),
        vec!["items[1][key] is missing"]
    );
    assert_eq!(messages(tree.validate(json!({"customer": "c"}))), vec!["items is missing"]);
}

#[test]
fn test_empty_array_placeholder_is_opt_in() {
    let tree = order_tree();
    let input = json!({"customer": "c", "items": []});
    assert!(tree.validate(input.clone()).is_ok());
    assert_eq!(
        messages(tree.validate_with(
            input,
            ValidationOptions {
                empty_array_placeholder: true
            }
        )),
        vec!["items[0][key] is missing"]
    );
}

#[test]
fn test_mutual_exclusion_lists_the_offenders() {
    let tree = order_tree();
    let base = |extra: Value| {
        let mut input = json!({"customer": "c", "items": []});
        input.as_object_mut().unwrap().extend(extra.as_object().unwrap().clone());
        tree.validate(input)
    };
    assert!(base(json!({"a": 1})).is_ok());
    assert_eq!(messages(base(json!({"a": 1, "b": 1}))), vec!["a, b are mutually exclusive"]);
}

#[test]
fn test_defaults_are_applied_per_element() {
    let tree = order_tree();
    let out = tree
        .validate(json!({"customer": "c", "items": [{"key": "a"}, {"key": "b", "qty": "4"}]}))
        .unwrap();
    assert_eq!(out["items"], json!([{"key": "a", "qty": 1}, {"key": "b", "qty": 4}]));
}

#[test]
fn test_given_block_follows_sibling_value() {
    let tree = ParamsTree::build(|root| {
        root.optional("shipping", ParamDecl::new())?;
        root.given(
            [Dependency::predicate("shipping", |v| v == "express")],
            |express| {
                express.requires("phone", ParamDecl::new())?;
                Ok(())
            },
        )?;
        Ok(())
    })
    .unwrap();
    assert_eq!(messages(tree.validate(json!({"shipping": "express"}))), vec!["phone is missing"]);
    assert!(tree.validate(json!({"shipping": "ground"})).is_ok());
    assert!(tree.validate(json!({})).is_ok());
}

#[test]
fn test_declared_renames_and_filters() {
    let tree = ParamsTree::build(|root| {
        root.requires("q", ParamDecl::new().as_name("query"))?;
        root.optional("limit", ParamDecl::of(TypeDescriptor::integer()))?;
        Ok(())
    })
    .unwrap();
    let coerced = tree.validate(json!({"q": "rust", "junk": true})).unwrap();
    assert_eq!(tree.declared(&coerced, false), json!({"query": "rust"}));
    assert_eq!(tree.declared(&coerced, true), json!({"query": "rust", "limit": null}));
}

#[test]
fn test_shared_tree_across_threads() {
    let tree = Arc::new(order_tree());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for n in 0..50 {
                    let input = if (i + n) % 2 == 0 {
                        json!({"customer": "c", "items": [{"key": "k", "qty": n.to_string()}]})
                    } else {
                        json!({"items": [{}]})
                    };
                    let result = tree.validate(input);
                    if (i + n) % 2 == 0 {
                        assert_eq!(result.unwrap()["items"][0]["qty"], json!(n));
                    } else {
                        assert_eq!(
                            result.unwrap_err().full_messages(),
                            vec!["customer is missing", "items[0][key] is missing"]
                        );
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_errors_render_as_grouped_json() {
    let tree = order_tree();
    let errors = tree.validate(json!({"items": [{}], "a": 1, "c": 2})).unwrap_err();
    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors.to_json(),
        json!([
            {"params": ["customer"], "messages": ["is missing"]},
            {"params": ["a", "c"], "messages": ["are mutually exclusive"]},
            {"params": ["items[0][key]"], "messages": ["is missing"]},
        ])
    );
}
