//! Canonical string parsers for primitive types.

use super::types::{InvalidValue, Primitive};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Number, Value};

const BOOLEAN_TRUE: [&str; 2] = ["true", "1"];
const BOOLEAN_FALSE: [&str; 2] = ["false", "0"];

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Converts `raw` into `primitive`. `null` passes through, and an empty string is
/// treated as `null` for every primitive except strings.
pub(crate) fn coerce_primitive(primitive: Primitive, raw: &Value) -> Result<Value, InvalidValue> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    if !matches!(primitive, Primitive::String | Primitive::Symbol) && raw.as_str() == Some("") {
        return Ok(Value::Null);
    }
    match primitive {
        Primitive::Integer => integer(raw),
        Primitive::Float => float(raw),
        Primitive::Numeric => numeric(raw),
        Primitive::Boolean => boolean(raw),
        Primitive::String | Primitive::Symbol => string(raw),
        Primitive::Date => date(raw),
        Primitive::DateTime | Primitive::Time => datetime(raw),
    }
}

fn integer(raw: &Value) -> Result<Value, InvalidValue> {
    match raw {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(raw.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Value::from(f as i64)),
            _ => Err(InvalidValue::default()),
        },
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| InvalidValue::default()),
        _ => Err(InvalidValue::default()),
    }
}

fn finite(f: f64) -> Result<Value, InvalidValue> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(InvalidValue::default)
}

fn float(raw: &Value) -> Result<Value, InvalidValue> {
    match raw {
        Value::Number(n) => n.as_f64().ok_or_else(InvalidValue::default).and_then(finite),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => finite(f),
            _ => Err(InvalidValue::default()),
        },
        _ => Err(InvalidValue::default()),
    }
}

fn numeric(raw: &Value) -> Result<Value, InvalidValue> {
    match raw {
        Value::Number(_) => Ok(raw.clone()),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::from(i)),
            Err(_) => float(raw),
        },
        _ => Err(InvalidValue::default()),
    }
}

fn boolean(raw: &Value) -> Result<Value, InvalidValue> {
    match raw {
        Value::Bool(_) => Ok(raw.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Ok(Value::Bool(true)),
            Some(0) => Ok(Value::Bool(false)),
            _ => Err(InvalidValue::default()),
        },
        Value::String(s) => {
            let lowered = s.trim().to_ascii_lowercase();
            if BOOLEAN_TRUE.contains(&lowered.as_str()) {
                Ok(Value::Bool(true))
            } else if BOOLEAN_FALSE.contains(&lowered.as_str()) {
                Ok(Value::Bool(false))
            } else {
                Err(InvalidValue::default())
            }
        }
        _ => Err(InvalidValue::default()),
    }
}

fn string(raw: &Value) -> Result<Value, InvalidValue> {
    match raw {
        Value::String(_) => Ok(raw.clone()),
        Value::Number(n) => Ok(Value::String(n.to_string())),
        Value::Bool(b) => Ok(Value::String(b.to_string())),
        _ => Err(InvalidValue::default()),
    }
}

fn date(raw: &Value) -> Result<Value, InvalidValue> {
    let s = raw.as_str().ok_or_else(InvalidValue::default)?.trim();
    let parsed = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| parse_naive_datetime(s).map(|dt| dt.date()))
        .ok_or_else(InvalidValue::default)?;
    Ok(Value::String(parsed.format("%Y-%m-%d").to_string()))
}

fn datetime(raw: &Value) -> Result<Value, InvalidValue> {
    let s = raw.as_str().ok_or_else(InvalidValue::default)?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::String(dt.to_rfc3339()));
    }
    let naive = parse_naive_datetime(s)
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(InvalidValue::default)?;
    Ok(Value::String(naive.and_utc().to_rfc3339()))
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
