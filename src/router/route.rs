use super::core::ParamVec;
use super::pattern::RoutePattern;
use crate::error::SchemaError;
use crate::validations::ParamsTree;
use crate::versioner::Versioner;
use http::Method;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// HTTP method a route answers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// Any method (`ANY` or `*`).
    Any,
    Only(Method),
}

impl RouteMethod {
    pub fn accepts(&self, method: &Method) -> bool {
        match self {
            RouteMethod::Any => true,
            RouteMethod::Only(m) => m == method,
        }
    }
}

impl FromStr for RouteMethod {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "ANY" | "*" => Ok(RouteMethod::Any),
            "" => Err(SchemaError::InvalidMethod(s.to_string())),
            _ => Method::from_bytes(upper.as_bytes())
                .map(RouteMethod::Only)
                .map_err(|_| SchemaError::InvalidMethod(s.to_string())),
        }
    }
}

impl From<Method> for RouteMethod {
    fn from(method: Method) -> Self {
        RouteMethod::Only(method)
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMethod::Any => f.write_str("ANY"),
            RouteMethod::Only(m) => f.write_str(m.as_str()),
        }
    }
}

/// One endpoint: method, compiled template, handler name and the contracts
/// applied once it matches.
#[derive(Debug, Clone)]
pub struct Route {
    method: RouteMethod,
    pattern: RoutePattern,
    handler: Arc<str>,
    description: Option<String>,
    format: Option<String>,
    metadata: Map<String, Value>,
    params: Option<Arc<ParamsTree>>,
    versioner: Option<Arc<dyn Versioner>>,
}

impl Route {
    pub fn new(method: impl Into<RouteMethod>, pattern: RoutePattern, handler: &str) -> Self {
        Self {
            method: method.into(),
            pattern,
            handler: Arc::from(handler),
            description: None,
            format: None,
            metadata: Map::new(),
            params: None,
            versioner: None,
        }
    }

    /// Parses `method` and compiles `template` (anchored, no requirements).
    pub fn parse(method: &str, template: &str, handler: &str) -> Result<Self, SchemaError> {
        Ok(Self::new(method.parse::<RouteMethod>()?, RoutePattern::new(template)?, handler))
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_params(mut self, params: Arc<ParamsTree>) -> Self {
        self.params = Some(params);
        self
    }

    #[must_use]
    pub fn with_versioner(mut self, versioner: Arc<dyn Versioner>) -> Self {
        self.versioner = Some(versioner);
        self
    }

    pub fn method(&self) -> &RouteMethod {
        &self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn params(&self) -> Option<&Arc<ParamsTree>> {
        self.params.as_ref()
    }

    pub fn versioner(&self) -> Option<&Arc<dyn Versioner>> {
        self.versioner.as_ref()
    }

    /// Prefix-only matching against the pattern origin.
    pub fn forward_match(&self) -> bool {
        !self.pattern.is_anchored()
    }

    pub fn matches(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        if self.forward_match() {
            path.starts_with(self.pattern.origin())
        } else {
            self.pattern.is_match(path)
        }
    }

    /// Path parameters for `path`, or `None` when the route does not match.
    pub fn path_params(&self, path: &str) -> Option<ParamVec> {
        if !self.matches(path) {
            return None;
        }
        Some(self.pattern.params(path).unwrap_or_default())
    }
}
