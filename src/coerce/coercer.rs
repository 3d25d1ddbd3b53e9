use super::primitive::coerce_primitive;
use super::types::{CustomType, InvalidValue, Primitive, TypeDescriptor};
use serde_json::Value;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// A coercion strategy compiled from one [`TypeDescriptor`].
///
/// Coercers hold no per-request state and are shared through the
/// [`CoercerCache`](super::CoercerCache).
#[derive(Debug)]
pub enum Coercer {
    Primitive(Primitive),
    Hash,
    Array {
        member: Option<Arc<Coercer>>,
        unique: bool,
    },
    Json,
    JsonArray,
    File,
    Custom(CustomType),
    Multiple(Vec<(TypeDescriptor, Arc<Coercer>)>),
    VariantCollection(Arc<Coercer>),
}

impl Coercer {
    /// Compiles `descriptor`, resolving member types through `member`.
    pub(crate) fn build<F>(descriptor: &TypeDescriptor, member: &F) -> Coercer
    where
        F: Fn(&TypeDescriptor) -> Arc<Coercer>,
    {
        match descriptor {
            TypeDescriptor::Primitive(p) => Coercer::Primitive(*p),
            TypeDescriptor::Hash => Coercer::Hash,
            TypeDescriptor::Array(m) => Coercer::Array {
                member: m.as_deref().map(member),
                unique: false,
            },
            TypeDescriptor::Set(m) => Coercer::Array {
                member: m.as_deref().map(member),
                unique: true,
            },
            TypeDescriptor::Json => Coercer::Json,
            TypeDescriptor::JsonArray => Coercer::JsonArray,
            TypeDescriptor::File => Coercer::File,
            TypeDescriptor::Custom(custom) => Coercer::Custom(custom.clone()),
            TypeDescriptor::Multiple(members) => Coercer::Multiple(
                members
                    .iter()
                    .map(|m| (m.clone(), member(m)))
                    .collect(),
            ),
            TypeDescriptor::VariantCollection(members) => {
                Coercer::VariantCollection(member(&TypeDescriptor::Multiple(members.clone())))
            }
        }
    }

    /// Converts `raw` into the target type. `null` always passes through unchanged.
    pub fn call(&self, raw: &Value) -> Result<Value, InvalidValue> {
        match self {
            Coercer::Primitive(p) => coerce_primitive(*p, raw),
            Coercer::Hash => match raw {
                Value::Null | Value::Object(_) => Ok(raw.clone()),
                _ => Err(InvalidValue::default()),
            },
            Coercer::Array { member, unique } => coerce_array(raw, member.as_deref(), *unique),
            Coercer::Json => coerce_json(raw),
            Coercer::JsonArray => coerce_json_array(raw),
            Coercer::File => match raw {
                Value::Null => Ok(Value::Null),
                Value::Object(map) if map.contains_key("tempfile") => Ok(raw.clone()),
                _ => Err(InvalidValue::default()),
            },
            Coercer::Custom(custom) => coerce_custom(custom, raw),
            Coercer::Multiple(members) => coerce_multiple(members, raw),
            Coercer::VariantCollection(variant) => match raw {
                Value::Null => Ok(Value::Null),
                Value::Array(items) => items
                    .iter()
                    .map(|item| variant.call(item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                _ => Err(InvalidValue::default()),
            },
        }
    }
}

fn coerce_array(raw: &Value, member: Option<&Coercer>, unique: bool) -> Result<Value, InvalidValue> {
    let items = match raw {
        Value::Null => return Ok(Value::Null),
        Value::Array(items) => items,
        _ => return Err(InvalidValue::default()),
    };
    let mut out: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        let coerced = match member {
            Some(m) => m.call(item)?,
            None => item.clone(),
        };
        if unique && out.contains(&coerced) {
            continue;
        }
        out.push(coerced);
    }
    Ok(Value::Array(out))
}

fn decode_json(raw: &Value) -> Result<Value, InvalidValue> {
    match raw {
        Value::String(s) => serde_json::from_str(s).map_err(|_| InvalidValue::default()),
        _ => Ok(raw.clone()),
    }
}

fn coerce_json(raw: &Value) -> Result<Value, InvalidValue> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match decode_json(raw)? {
        decoded @ Value::Object(_) => Ok(decoded),
        Value::Array(items) if items.iter().all(Value::is_object) => Ok(Value::Array(items)),
        _ => Err(InvalidValue::default()),
    }
}

fn coerce_json_array(raw: &Value) -> Result<Value, InvalidValue> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match decode_json(raw)? {
        object @ Value::Object(_) => Ok(Value::Array(vec![object])),
        Value::Array(items) if items.iter().all(Value::is_object) => Ok(Value::Array(items)),
        _ => Err(InvalidValue::default()),
    }
}

fn coerce_custom(custom: &CustomType, raw: &Value) -> Result<Value, InvalidValue> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    // A panicking parser is reported as an invalid value, not propagated.
    match catch_unwind(AssertUnwindSafe(|| custom.parse(raw))) {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(custom_type = custom.name(), "Custom type parser panicked");
            Err(InvalidValue::default())
        }
    }
}

fn coerce_multiple(
    members: &[(TypeDescriptor, Arc<Coercer>)],
    raw: &Value,
) -> Result<Value, InvalidValue> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    members
        .iter()
        .find_map(|(_, coercer)| coercer.call(raw).ok())
        .ok_or_else(InvalidValue::default)
}
