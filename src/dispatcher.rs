//! Request pipeline: routing, version resolution, format negotiation and
//! parameter validation, in that order.
//!
//! The dispatcher stops at the endpoint boundary. It returns the matched
//! route with its coerced parameters, or a [`DispatchError`] carrying the
//! status and headers a host should answer with.

use crate::format::{ContentTypes, FormatError, DEFAULT_FORMAT};
use crate::request::{merge_params, RequestParts};
use crate::router::{ParamVec, Route, RouteLookup, Router};
use crate::validations::ValidationErrors;
use crate::versioner::{VersionError, VersionerState};
use http::Method;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// Path capture that carries the version for path versioning; it is not
/// forwarded as a parameter.
pub const VERSION_CAPTURE: &str = "version";

/// A request that passed every stage.
#[derive(Debug, Clone)]
pub struct Dispatched {
    pub route: Arc<Route>,
    /// Merged and coerced parameters (query < body < path).
    pub params: Value,
    pub path_params: ParamVec,
    pub version: Option<VersionerState>,
    pub format: String,
}

impl Dispatched {
    pub fn handler(&self) -> &str {
        self.route.handler()
    }

    /// Parameters filtered to the route's declared ones. Routes without a
    /// parameter contract return all parameters.
    pub fn declared(&self, include_missing: bool) -> Value {
        match self.route.params() {
            Some(tree) => tree.declared(&self.params, include_missing),
            None => self.params.clone(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    #[error("Not Found")]
    NotFound,
    #[error("405 Not Allowed")]
    MethodNotAllowed { allowed: Vec<Method> },
    #[error(transparent)]
    Version(#[from] VersionError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl DispatchError {
    pub fn status(&self) -> u16 {
        match self {
            DispatchError::NotFound => 404,
            DispatchError::MethodNotAllowed { .. } => 405,
            DispatchError::Version(e) => e.status,
            DispatchError::Format(e) => e.status(),
            DispatchError::Validation(e) => e.status().unwrap_or(400),
        }
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            DispatchError::NotFound => vec![(crate::versioner::CASCADE_HEADER.to_string(), "pass".to_string())],
            DispatchError::MethodNotAllowed { allowed } => {
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                vec![("Allow".to_string(), allow)]
            }
            DispatchError::Version(e) => e.headers(),
            DispatchError::Format(_) => Vec::new(),
            DispatchError::Validation(e) => e.headers(),
        }
    }

    /// `{"error": message}`; validation failures add the grouped details.
    pub fn body(&self) -> Value {
        match self {
            DispatchError::Validation(errors) => json!({
                "error": errors.to_string(),
                "details": errors.to_json(),
            }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

/// Routes and validates requests against a fixed routing table.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    content_types: ContentTypes,
    default_format: String,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            content_types: ContentTypes::default(),
            default_format: DEFAULT_FORMAT.to_string(),
        }
    }

    #[must_use]
    pub fn with_content_types(mut self, content_types: ContentTypes) -> Self {
        self.content_types = content_types;
        self
    }

    #[must_use]
    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = format.into();
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn content_types(&self) -> &ContentTypes {
        &self.content_types
    }

    pub fn dispatch(&self, request: &RequestParts) -> Result<Dispatched, DispatchError> {
        let started = Instant::now();
        let found = match self.router.recognize(request) {
            RouteLookup::Found(found) => found,
            RouteLookup::MethodNotAllowed { allowed } => return Err(DispatchError::MethodNotAllowed { allowed }),
            RouteLookup::Rejected(error) => return Err(error.into()),
            RouteLookup::NotFound => return Err(DispatchError::NotFound),
        };
        let route = Arc::clone(&found.route);

        let format = self
            .content_types
            .negotiate(request, route.format(), &self.default_format)?;

        let mut query = request.query.clone();
        if let Some(versioner) = route.versioner() {
            versioner.strip(&mut query);
        }
        let mut path = found.path_params_map();
        path.remove(VERSION_CAPTURE);
        let merged = Value::Object(merge_params(&query, request.body.as_ref(), path));

        let params = match route.params() {
            Some(tree) => tree.validate(merged).map_err(|errors| {
                debug!(
                    handler_name = %route.handler(),
                    error_count = errors.len(),
                    "Request parameters rejected"
                );
                errors
            })?,
            None => merged,
        };

        info!(
            handler_name = %route.handler(),
            method = %request.method,
            path = %request.path,
            format = %format,
            version = ?found.version(),
            duration_us = started.elapsed().as_micros(),
            "Request dispatched"
        );

        Ok(Dispatched {
            route,
            params,
            path_params: found.path_params,
            version: found.version,
            format,
        })
    }
}
