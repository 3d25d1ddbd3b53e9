use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;
use paramgate::router::{Route, Router};
use paramgate::runtime_config::RuntimeConfig;
use std::hint::black_box;

fn zoo_routes() -> Vec<Route> {
    let mut routes = Vec::new();
    for resource in ["animals", "keepers", "habitats", "feeds", "tickets", "events", "vets", "toys"] {
        routes.push(Route::parse("GET", &format!("/zoo/{resource}(.:format)"), &format!("list_{resource}")).unwrap());
        routes.push(Route::parse("POST", &format!("/zoo/{resource}(.:format)"), &format!("create_{resource}")).unwrap());
        routes.push(Route::parse("GET", &format!("/zoo/{resource}/:id(.:format)"), &format!("show_{resource}")).unwrap());
        routes.push(
            Route::parse("GET", &format!("/zoo/{resource}/:id/notes/:note_id"), &format!("note_{resource}")).unwrap(),
        );
        routes.push(Route::parse("DELETE", &format!("/zoo/{resource}/:id"), &format!("delete_{resource}")).unwrap());
    }
    routes.push(
        Route::parse(
            "GET",
            "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id",
            "habitat_section",
        )
        .unwrap(),
    );
    routes
}

fn bench_route_throughput(c: &mut Criterion) {
    let test_paths = [
        (Method::GET, "/zoo/animals/123"),
        (Method::GET, "/zoo/toys/123/notes/456"),
        (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        (Method::POST, "/zoo/vets.json"),
        (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
    ];

    let mut group = c.benchmark_group("route_match");
    for (label, threshold) in [("sequential", usize::MAX), ("combined", 0)] {
        let config = RuntimeConfig {
            greedy_threshold: threshold,
            ..RuntimeConfig::default()
        };
        let router = Router::with_config(zoo_routes(), &config);
        group.bench_with_input(BenchmarkId::from_parameter(label), &router, |b, router| {
            b.iter(|| {
                for (method, path) in test_paths.iter() {
                    let res = router.route(method.clone(), path);
                    black_box(&res);
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_route_throughput);
criterion_main!(benches);
