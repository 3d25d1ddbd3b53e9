//! Request-side inputs for routing and validation.
//!
//! The transport layer is not part of this crate; a host hands over a
//! [`RequestParts`] built from whatever server it runs. Query strings are
//! parsed with Rack-style nesting (`a[b]=1`, `a[]=1`, `a[][k]=1`) so nested
//! parameter trees can be fed from plain URLs.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use serde_json::{Map, Value};
use tracing::warn;

/// Header consulted for method overrides on `POST`.
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// The pieces of an inbound request the core reads.
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    pub headers: HeaderMap,
    /// Parsed query parameters.
    pub query: Map<String, Value>,
    /// Already-deserialized body, if any.
    pub body: Option<Value>,
}

impl RequestParts {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: Map::new(),
            body: None,
        }
    }

    /// Splits `uri` (`/path?query`) into path and nested query parameters.
    pub fn from_uri(method: Method, uri: &str) -> Self {
        match uri.split_once('?') {
            Some((path, query)) => Self::new(method, path).with_query(query),
            None => Self::new(method, uri),
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: &str) -> Self {
        let parsed = parse_nested_query(query);
        deep_merge(&mut self.query, parsed);
        self
    }

    /// Adds a header. Names or values that are not valid HTTP are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid request header"),
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First value of `name`, if it is valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Method used for routing: `POST` may be overridden by
    /// `X-HTTP-Method-Override`; every other method is taken as sent.
    pub fn effective_method(&self) -> Method {
        if self.method != Method::POST {
            return self.method.clone();
        }
        self.header(METHOD_OVERRIDE_HEADER)
            .map(|m| m.trim().to_ascii_uppercase())
            .and_then(|m| Method::from_bytes(m.as_bytes()).ok())
            .unwrap_or(Method::POST)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    /// `[]`
    Push,
}

/// Parses a query string into nested JSON values.
///
/// ```
/// use paramgate::request::parse_nested_query;
/// use serde_json::json;
///
/// let parsed = parse_nested_query("user[name]=ann&tags[]=a&tags[]=b&items[][k]=1&items[][k]=2");
/// assert_eq!(
///     serde_json::Value::Object(parsed),
///     json!({
///         "user": {"name": "ann"},
///         "tags": ["a", "b"],
///         "items": [{"k": "1"}, {"k": "2"}]
///     })
/// );
/// ```
pub fn parse_nested_query(query: &str) -> Map<String, Value> {
    let mut params = Map::new();
    for (name, value) in url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
        if name.is_empty() {
            continue;
        }
        let (head, rest) = split_name(&name);
        insert(&mut params, &head, &rest, Value::String(value.into_owned()));
    }
    params
}

/// `a[b][]` → (`a`, [Key(b), Push]). Malformed brackets keep the whole name.
fn split_name(name: &str) -> (String, Vec<Segment>) {
    let Some(open) = name.find('[') else {
        return (name.to_string(), Vec::new());
    };
    if open == 0 {
        return (name.to_string(), Vec::new());
    }
    let mut segments = Vec::new();
    let mut rest = &name[open..];
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return (name.to_string(), Vec::new());
        };
        let key = &inner[..close];
        segments.push(if key.is_empty() {
            Segment::Push
        } else {
            Segment::Key(key.to_string())
        });
        rest = &inner[close + 1..];
    }
    if !rest.is_empty() {
        return (name.to_string(), Vec::new());
    }
    (name[..open].to_string(), segments)
}

fn insert(target: &mut Map<String, Value>, key: &str, rest: &[Segment], value: Value) {
    match rest.first() {
        None => {
            target.insert(key.to_string(), value);
        }
        Some(Segment::Push) => {
            let slot = target
                .entry(key.to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            let Value::Array(items) = slot else {
                return;
            };
            match rest.get(1) {
                Some(Segment::Key(child)) => {
                    let tail = &rest[2..];
                    let reuse = matches!(items.last(), Some(Value::Object(m)) if !has_path(m, child, tail));
                    if !reuse {
                        items.push(Value::Object(Map::new()));
                    }
                    if let Some(Value::Object(member)) = items.last_mut() {
                        insert(member, child, tail, value);
                    }
                }
                _ => items.push(value),
            }
        }
        Some(Segment::Key(child)) => {
            let slot = target
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(nested) = slot {
                insert(nested, child, &rest[1..], value);
            }
        }
    }
}

fn has_path(map: &Map<String, Value>, key: &str, tail: &[Segment]) -> bool {
    match (map.get(key), tail.first()) {
        (None, _) => false,
        (Some(_), None | Some(Segment::Push)) => true,
        (Some(value), Some(Segment::Key(next))) => value
            .as_object()
            .is_some_and(|nested| has_path(nested, next, &tail[1..])),
    }
}

/// Merges `source` into `target`; objects merge key by key, anything else
/// is replaced.
pub fn deep_merge(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        let Value::Object(incoming) = value else {
            target.insert(key, value);
            continue;
        };
        if let Some(Value::Object(existing)) = target.get_mut(&key) {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key, Value::Object(incoming));
    }
}

/// Parameter set handed to validation: query, then body, then path captures,
/// later sources winning. Non-object bodies contribute nothing.
pub fn merge_params(
    query: &Map<String, Value>,
    body: Option<&Value>,
    path: Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = query.clone();
    if let Some(Value::Object(body)) = body {
        deep_merge(&mut merged, body.clone());
    }
    deep_merge(&mut merged, path);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_flat_and_nested_keys() {
        let parsed = parse_nested_query("a=1&b[c]=2&b[d][e]=3&plus=a+b&enc=%2Fx");
        assert_eq!(
            Value::Object(parsed),
            json!({"a": "1", "b": {"c": "2", "d": {"e": "3"}}, "plus": "a b", "enc": "/x"})
        );
    }

    #[test]
    fn test_array_of_hashes_starts_new_member_on_repeated_key() {
        let parsed = parse_nested_query("items[][k]=1&items[][v]=x&items[][k]=2");
        assert_eq!(
            Value::Object(parsed),
            json!({"items": [{"k": "1", "v": "x"}, {"k": "2"}]})
        );
    }

    #[test]
    fn test_malformed_brackets_keep_literal_name() {
        let parsed = parse_nested_query("a[b=1&[x]=2");
        assert_eq!(parsed.get("a[b"), Some(&json!("1")));
        assert_eq!(parsed.get("[x]"), Some(&json!("2")));
    }

    #[test]
    fn test_later_scalar_is_replaced_by_container() {
        let parsed = parse_nested_query("a=1&a[b]=2");
        assert_eq!(parsed.get("a"), Some(&json!({"b": "2"})));
    }

    #[test]
    fn test_method_override_applies_to_post_only() {
        let post = RequestParts::new(Method::POST, "/").with_header("X-HTTP-Method-Override", "delete");
        assert_eq!(post.effective_method(), Method::DELETE);

        let get = RequestParts::new(Method::GET, "/").with_header("X-HTTP-Method-Override", "DELETE");
        assert_eq!(get.effective_method(), Method::GET);
    }

    #[test]
    fn test_from_uri_splits_query() {
        let req = RequestParts::from_uri(Method::GET, "/things?apiver=v1&x=5");
        assert_eq!(req.path, "/things");
        assert_eq!(req.query.get("apiver"), Some(&json!("v1")));
        assert_eq!(req.query.get("x"), Some(&json!("5")));
    }

    #[test]
    fn test_merge_order_is_query_body_path() {
        let query = parse_nested_query("id=q&q=1&nested[a]=1");
        let body = json!({"id": "b", "b": 2, "nested": {"b": 2}});
        let mut path = Map::new();
        path.insert("id".into(), json!("p"));

        let merged = merge_params(&query, Some(&body), path);
        assert_eq!(
            Value::Object(merged),
            json!({"id": "p", "q": "1", "b": 2, "nested": {"a": "1", "b": 2}})
        );
    }
}
