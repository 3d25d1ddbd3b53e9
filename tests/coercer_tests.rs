#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Coercer cache behavior under concurrent lookups.

use paramgate::coerce::{CoercerCache, TypeDescriptor};
use serde_json::{json, Value};
use std::sync::{Arc, Barrier};
use std::thread;

const DESCRIPTORS: &[&str] = &["Integer", "Array[Integer]", "Set[String]", "[Integer, Boolean]", "Date"];

fn samples() -> Vec<Value> {
    vec![
        json!("42"),
        json!(["1", "2", "2"]),
        json!("true"),
        json!("2024-02-29"),
        json!(""),
        json!(null),
        json!({"k": 1}),
    ]
}

fn outcomes(cache: &CoercerCache, descriptor: &TypeDescriptor) -> Vec<Option<Value>> {
    let coercer = cache.get_or_build(descriptor);
    samples().iter().map(|raw| coercer.call(raw).ok()).collect()
}

#[test]
fn test_same_descriptor_same_behavior_in_any_order() {
    let descriptors: Vec<TypeDescriptor> = DESCRIPTORS.iter().map(|d| d.parse().unwrap()).collect();

    let forward = CoercerCache::new(true);
    let expected: Vec<_> = descriptors.iter().map(|d| outcomes(&forward, d)).collect();

    let backward = CoercerCache::new(true);
    for (i, descriptor) in descriptors.iter().enumerate().rev() {
        assert_eq!(outcomes(&backward, descriptor), expected[i]);
    }

    let uncached = CoercerCache::new(false);
    for (i, descriptor) in descriptors.iter().enumerate() {
        assert_eq!(outcomes(&uncached, descriptor), expected[i]);
    }
    assert_eq!(uncached.size(), 0);
}

#[test]
fn test_concurrent_lookups_share_one_entry_per_signature() {
    let cache = Arc::new(CoercerCache::new(true));
    let barrier = Arc::new(Barrier::new(8));
    let reference = CoercerCache::new(false);
    let expected: Vec<_> = DESCRIPTORS
        .iter()
        .map(|d| outcomes(&reference, &d.parse().unwrap()))
        .collect();
    let expected = Arc::new(expected);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            let expected = Arc::clone(&expected);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..20 {
                    let i = (t + round) % DESCRIPTORS.len();
                    let descriptor: TypeDescriptor = DESCRIPTORS[i].parse().unwrap();
                    assert_eq!(outcomes(&cache, &descriptor), expected[i]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // One entry per top-level signature plus the shared member coercers.
    let size = cache.size();
    for descriptor in DESCRIPTORS {
        let parsed: TypeDescriptor = descriptor.parse().unwrap();
        let first = cache.get_or_build(&parsed);
        let second = cache.get_or_build(&parsed);
        assert!(Arc::ptr_eq(&first, &second));
    }
    assert_eq!(cache.size(), size);
}

#[test]
fn test_expected_coercions() {
    let cache = CoercerCache::new(true);
    let integers: TypeDescriptor = "Array[Integer]".parse().unwrap();
    assert_eq!(cache.get_or_build(&integers).call(&json!(["1", "2", "2"])).unwrap(), json!([1, 2, 2]));

    let set: TypeDescriptor = "Set[Integer]".parse().unwrap();
    assert_eq!(cache.get_or_build(&set).call(&json!(["1", "2", "2"])).unwrap(), json!([1, 2]));

    let integer: TypeDescriptor = "Integer".parse().unwrap();
    assert_eq!(cache.get_or_build(&integer).call(&json!("")).unwrap(), Value::Null);
    assert!(cache.get_or_build(&integer).call(&json!("4x")).is_err());
}
