use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use paramgate::coerce::TypeDescriptor;
use paramgate::definition::{build_dispatcher, ApiDefinition};
use paramgate::request::RequestParts;
use paramgate::runtime_config::RuntimeConfig;
use paramgate::validations::{ParamDecl, ParamsTree, ValueSet};
use serde_json::json;
use std::hint::black_box;

fn order_tree() -> ParamsTree {
    ParamsTree::build(|root| {
        root.requires("customer", ParamDecl::of(TypeDescriptor::string()).length(Some(1), Some(64)))?;
        root.optional("page", ParamDecl::of(TypeDescriptor::integer()).default_value(1))?;
        root.requires_group("items", ParamDecl::of(TypeDescriptor::array()), |items| {
            items.requires("sku", ParamDecl::new().regexp(r"^[A-Z]{3}-\d+$"))?;
            items.requires(
                "quantity",
                ParamDecl::of(TypeDescriptor::integer()).values(ValueSet::list([1, 2, 3, 4, 5])),
            )?;
            Ok(())
        })?;
        root.optional("coupon", ParamDecl::new())?
            .optional("gift_card", ParamDecl::new())?
            .mutually_exclusive(&["coupon", "gift_card"])?;
        Ok(())
    })
    .unwrap()
}

fn bench_validate(c: &mut Criterion) {
    let tree = order_tree();
    let items: Vec<_> = (0..20).map(|i| json!({"sku": format!("ABC-{i}"), "quantity": "3"})).collect();
    let valid = json!({"customer": "c-1", "items": items, "coupon": "X"});
    let invalid = json!({"items": [{"sku": "bad", "quantity": "9"}, {}], "coupon": "X", "gift_card": "Y"});

    c.bench_function("validate_valid_order", |b| {
        b.iter(|| black_box(tree.validate(valid.clone())))
    });
    c.bench_function("validate_invalid_order", |b| {
        b.iter(|| black_box(tree.validate(invalid.clone())))
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let definition: ApiDefinition = serde_yaml::from_str(
        r#"
prefix: api
version: { using: path, versions: [v1] }
routes:
  - method: GET
    path: /orders
    handler: list_orders
    params:
      - { name: page, type: Integer, default: 1 }
      - name: filter
        type: Hash
        params:
          - { name: status, values: [open, closed] }
"#,
    )
    .unwrap();
    let dispatcher = build_dispatcher(&definition, &RuntimeConfig::default()).unwrap();
    let request = RequestParts::from_uri(Method::GET, "/api/v1/orders?page=2&filter[status]=open");
    c.bench_function("dispatch_query_request", |b| {
        b.iter(|| black_box(dispatcher.dispatch(&request).is_ok()))
    });
}

criterion_group!(benches, bench_validate, bench_dispatch);
criterion_main!(benches);
