use super::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn coerce(desc: TypeDescriptor, raw: Value) -> Result<Value, InvalidValue> {
    CoercerCache::new(true).get_or_build(&desc).call(&raw)
}

#[derive(Debug)]
struct Upper(String);

impl Parseable for Upper {
    fn parse(raw: &Value) -> Result<Self, InvalidValue> {
        raw.as_str()
            .map(|s| Upper(s.to_uppercase()))
            .ok_or_else(|| InvalidValue::with_message("must be text"))
    }

    fn into_value(self) -> Value {
        Value::String(self.0)
    }
}

#[test]
fn test_integer_from_string() {
    assert_eq!(coerce(TypeDescriptor::integer(), json!("42")), Ok(json!(42)));
    assert_eq!(coerce(TypeDescriptor::integer(), json!(" -7 ")), Ok(json!(-7)));
    assert!(coerce(TypeDescriptor::integer(), json!("4.2")).is_err());
    assert!(coerce(TypeDescriptor::integer(), json!("x")).is_err());
}

#[test]
fn test_integer_from_whole_float() {
    assert_eq!(coerce(TypeDescriptor::integer(), json!(3.0)), Ok(json!(3)));
    assert!(coerce(TypeDescriptor::integer(), json!(3.5)).is_err());
}

#[test]
fn test_empty_string_is_null_for_non_strings() {
    assert_eq!(coerce(TypeDescriptor::integer(), json!("")), Ok(Value::Null));
    assert_eq!(coerce(TypeDescriptor::boolean(), json!("")), Ok(Value::Null));
    assert_eq!(coerce(TypeDescriptor::string(), json!("")), Ok(json!("")));
}

#[test]
fn test_null_passes_through() {
    for desc in [
        TypeDescriptor::integer(),
        TypeDescriptor::Hash,
        TypeDescriptor::array(),
        TypeDescriptor::Json,
        TypeDescriptor::custom::<Upper>(),
    ] {
        assert_eq!(coerce(desc, Value::Null), Ok(Value::Null));
    }
}

#[test]
fn test_boolean_literal_set() {
    for (raw, expected) in [
        ("true", true),
        ("TRUE", true),
        ("1", true),
        ("false", false),
        ("0", false),
    ] {
        assert_eq!(coerce(TypeDescriptor::boolean(), json!(raw)), Ok(json!(expected)));
    }
    assert!(coerce(TypeDescriptor::boolean(), json!("yes")).is_err());
    assert!(coerce(TypeDescriptor::boolean(), json!(2)).is_err());
}

#[test]
fn test_float_rejects_non_finite() {
    assert_eq!(coerce(TypeDescriptor::float(), json!("1.5")), Ok(json!(1.5)));
    assert!(coerce(TypeDescriptor::float(), json!("NaN")).is_err());
    assert!(coerce(TypeDescriptor::float(), json!("inf")).is_err());
}

#[test]
fn test_string_stringifies_scalars() {
    assert_eq!(coerce(TypeDescriptor::string(), json!(5)), Ok(json!("5")));
    assert_eq!(coerce(TypeDescriptor::string(), json!(true)), Ok(json!("true")));
    assert!(coerce(TypeDescriptor::string(), json!({"a": 1})).is_err());
}

#[test]
fn test_date_and_datetime() {
    assert_eq!(coerce(TypeDescriptor::date(), json!("2024-02-29")), Ok(json!("2024-02-29")));
    assert!(coerce(TypeDescriptor::date(), json!("2023-02-29")).is_err());
    assert_eq!(
        coerce(Primitive::DateTime.into(), json!("2024-01-02 03:04:05")),
        Ok(json!("2024-01-02T03:04:05+00:00"))
    );
}

#[test]
fn test_array_member_coercion() {
    let desc = TypeDescriptor::array_of(TypeDescriptor::integer());
    assert_eq!(coerce(desc.clone(), json!(["1", 2])), Ok(json!([1, 2])));
    assert!(coerce(desc.clone(), json!(["1", "b"])).is_err());
    assert!(coerce(desc, json!("1")).is_err());
}

#[test]
fn test_untyped_array_passes_through() {
    assert_eq!(coerce(TypeDescriptor::array(), json!([{"a": 1}])), Ok(json!([{"a": 1}])));
    assert!(coerce(TypeDescriptor::array(), json!({"a": 1})).is_err());
}

#[test]
fn test_set_deduplicates() {
    let desc = TypeDescriptor::set_of(TypeDescriptor::integer());
    assert_eq!(coerce(desc, json!(["1", 1, "2"])), Ok(json!([1, 2])));
}

#[test]
fn test_json_strategies() {
    assert_eq!(coerce(TypeDescriptor::Json, json!(r#"{"a":1}"#)), Ok(json!({"a": 1})));
    assert!(coerce(TypeDescriptor::Json, json!("not json")).is_err());
    assert!(coerce(TypeDescriptor::Json, json!("5")).is_err());
    assert_eq!(
        coerce(TypeDescriptor::JsonArray, json!(r#"{"a":1}"#)),
        Ok(json!([{"a": 1}]))
    );
    assert!(coerce(TypeDescriptor::JsonArray, json!("[1]")).is_err());
}

#[test]
fn test_file_requires_tempfile() {
    assert!(coerce(TypeDescriptor::File, json!({"tempfile": "/tmp/x", "filename": "a"})).is_ok());
    assert!(coerce(TypeDescriptor::File, json!("a")).is_err());
}

#[test]
fn test_custom_parseable() {
    assert_eq!(coerce(TypeDescriptor::custom::<Upper>(), json!("abc")), Ok(json!("ABC")));
    assert_eq!(
        coerce(TypeDescriptor::custom::<Upper>(), json!(1)),
        Err(InvalidValue::with_message("must be text"))
    );
}

#[test]
fn test_panicking_custom_parser_is_invalid() {
    let desc = TypeDescriptor::Custom(CustomType::new("Exploding", |_| panic!("boom")));
    assert_eq!(coerce(desc, json!("x")), Err(InvalidValue::default()));
}

#[test]
fn test_multiple_takes_first_successful_type_in_declared_order() {
    let desc = TypeDescriptor::Multiple(vec![TypeDescriptor::integer(), TypeDescriptor::string()]);
    assert_eq!(coerce(desc.clone(), json!("12")), Ok(json!(12)));
    assert_eq!(coerce(desc.clone(), json!(12)), Ok(json!(12)));
    assert_eq!(coerce(desc.clone(), json!("twelve")), Ok(json!("twelve")));
    let desc = TypeDescriptor::Multiple(vec![TypeDescriptor::string(), TypeDescriptor::integer()]);
    assert_eq!(coerce(desc.clone(), json!("12")), Ok(json!("12")));
    let desc = TypeDescriptor::Multiple(vec![TypeDescriptor::integer(), TypeDescriptor::boolean()]);
    assert_eq!(coerce(desc.clone(), json!("12")), Ok(json!(12)));
    assert_eq!(coerce(desc.clone(), json!("true")), Ok(json!(true)));
    assert!(coerce(desc, json!("nope")).is_err());
}

#[test]
fn test_variant_collection() {
    let desc: TypeDescriptor = "[Integer, Boolean]".parse().unwrap();
    assert_eq!(coerce(desc.clone(), json!(["1", "false"])), Ok(json!([1, false])));
    assert!(coerce(desc, json!(["1", "x"])).is_err());
}

#[test]
fn test_from_str_type_names() {
    assert_eq!("Array[Integer]".parse::<TypeDescriptor>().unwrap().signature(), "Array[Integer]");
    assert_eq!("Set[String]".parse::<TypeDescriptor>().unwrap().signature(), "Set[String]");
    assert!(matches!("Array[JSON]".parse::<TypeDescriptor>().unwrap(), TypeDescriptor::JsonArray));
    assert!(matches!("BigDecimal".parse::<TypeDescriptor>().unwrap(), TypeDescriptor::Primitive(Primitive::Numeric)));
    assert!("Widget".parse::<TypeDescriptor>().is_err());
}

#[test]
fn test_cache_memoizes_by_signature() {
    let cache = CoercerCache::new(true);
    let a = cache.get_or_build(&TypeDescriptor::array_of(TypeDescriptor::string()));
    let b = cache.get_or_build(&TypeDescriptor::array_of(TypeDescriptor::string()));
    assert!(Arc::ptr_eq(&a, &b));
    // Array[String] and its String member
    assert_eq!(cache.size(), 2);
    cache.clear();
    assert_eq!(cache.size(), 0);
}

#[test]
fn test_disabled_cache_builds_fresh() {
    let cache = CoercerCache::new(false);
    let a = cache.get_or_build(&TypeDescriptor::integer());
    let b = cache.get_or_build(&TypeDescriptor::integer());
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(a.call(&json!("3")), b.call(&json!("3")));
    assert_eq!(cache.size(), 0);
}
