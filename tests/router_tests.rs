#![allow(clippy::unwrap_used, clippy::expect_used)]

use http::Method;
use paramgate::router::{Route, RouteLookup, Router};
use paramgate::runtime_config::RuntimeConfig;
use std::sync::Arc;
use std::thread;

fn zoo_routes() -> Vec<(&'static str, &'static str, &'static str)> {
    vec![
        ("GET", "/zoo/animals(.:format)", "get_animals"),
        ("POST", "/zoo/animals(.:format)", "create_animal"),
        ("GET", "/zoo/animals/:id(.:format)", "get_animal"),
        ("PUT", "/zoo/animals/:id(.:format)", "update_animal"),
        ("PATCH", "/zoo/animals/:id(.:format)", "patch_animal"),
        ("DELETE", "/zoo/animals/:id(.:format)", "delete_animal"),
        ("GET", "/zoo/animals/:id/toys/:toy_id", "animal_toy"),
        ("OPTIONS", "/zoo/health", "supported_ops"),
    ]
}

fn build(order: &[usize], greedy_threshold: usize) -> Router {
    let table = zoo_routes();
    let routes = order
        .iter()
        .map(|&i| {
            let (method, template, handler) = table[i];
            Route::parse(method, template, handler).unwrap()
        })
        .collect();
    let config = RuntimeConfig {
        greedy_threshold,
        ..RuntimeConfig::default()
    };
    Router::with_config(routes, &config)
}

fn handler(router: &Router, method: Method, path: &str) -> Option<String> {
    match router.route(method, path) {
        RouteLookup::Found(found) => Some(found.handler().to_string()),
        _ => None,
    }
}

#[test]
fn test_method_resolution_ignores_registration_interleaving() {
    let n = zoo_routes().len();
    let orders: Vec<Vec<usize>> = vec![
        (0..n).collect(),
        (0..n).rev().collect(),
        (0..n).step_by(2).chain((1..n).step_by(2)).collect(),
        (1..n).step_by(2).chain((0..n).step_by(2)).collect(),
    ];
    for order in &orders {
        for threshold in [0, 1000] {
            let router = build(order, threshold);
            assert_eq!(handler(&router, Method::GET, "/zoo/animals").as_deref(), Some("get_animals"));
            assert_eq!(handler(&router, Method::POST, "/zoo/animals").as_deref(), Some("create_animal"));
            assert_eq!(handler(&router, Method::PUT, "/zoo/animals/7").as_deref(), Some("update_animal"));
            assert_eq!(handler(&router, Method::DELETE, "/zoo/animals/7.json").as_deref(), Some("delete_animal"));
            assert_eq!(handler(&router, Method::GET, "/zoo/animals/7/toys/1").as_deref(), Some("animal_toy"));
        }
    }
}

#[test]
fn test_wrong_method_is_distinguishable_from_no_route() {
    let router = build(&(0..zoo_routes().len()).collect::<Vec<_>>(), 32);
    match router.route(Method::DELETE, "/zoo/animals") {
        RouteLookup::MethodNotAllowed { allowed } => {
            assert_eq!(allowed, vec![Method::GET, Method::HEAD, Method::POST]);
        }
        other => panic!("expected 405, got {other:?}"),
    }
    assert!(matches!(router.route(Method::GET, "/zoo/keepers"), RouteLookup::NotFound));
    assert!(matches!(router.route(Method::GET, "/zoo/health"), RouteLookup::MethodNotAllowed { .. }));
}

#[test]
fn test_path_params_are_extracted() {
    let router = build(&(0..zoo_routes().len()).collect::<Vec<_>>(), 32);
    let found = router.route(Method::GET, "/zoo/animals/12/toys/ball%20red").into_match().unwrap();
    assert_eq!(found.get_path_param("id"), Some("12"));
    assert_eq!(found.get_path_param("toy_id"), Some("ball red"));
}

#[test]
fn test_router_is_shared_across_threads() {
    let router = Arc::new(build(&(0..zoo_routes().len()).collect::<Vec<_>>(), 0));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let router = Arc::clone(&router);
            thread::spawn(move || {
                for i in 0..100 {
                    let path = format!("/zoo/animals/{}", t * 100 + i);
                    let found = router.route(Method::PATCH, &path).into_match().unwrap();
                    assert_eq!(found.handler(), "patch_animal");
                    assert_eq!(found.get_path_param("id"), Some((t * 100 + i).to_string().as_str()));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}
