//! Router core: method groups, candidate selection, version cascade.

use super::greedy::GreedyMatcher;
use super::path::normalize_path;
use super::route::{Route, RouteMethod};
use crate::request::RequestParts;
use crate::runtime_config::RuntimeConfig;
use crate::versioner::{VersionError, VersionerState};
use http::Method;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Path parameters in template order. Names are shared with the compiled
/// pattern; values are per request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A route accepted for a request, with what was extracted on the way.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub path_params: ParamVec,
    /// Present when the route is versioned.
    pub version: Option<VersionerState>,
}

impl RouteMatch {
    pub fn handler(&self) -> &str {
        self.route.handler()
    }

    /// Last value captured under `name`.
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Path parameters as JSON strings, ready to merge into request params.
    #[must_use]
    pub fn path_params_map(&self) -> Map<String, Value> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_ref().and_then(|v| v.version.as_deref())
    }
}

/// Outcome of routing one request.
#[derive(Debug, Clone)]
pub enum RouteLookup {
    Found(RouteMatch),
    /// The path matches routes of other methods only.
    MethodNotAllowed { allowed: Vec<Method> },
    /// Every matching route refused the request's version; the error is the
    /// last one seen, or the first one that does not cascade.
    Rejected(VersionError),
    NotFound,
}

impl RouteLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, RouteLookup::Found(_))
    }

    pub fn into_match(self) -> Option<RouteMatch> {
        match self {
            RouteLookup::Found(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct MethodGroup {
    routes: Vec<Arc<Route>>,
    greedy: Option<GreedyMatcher>,
}

impl MethodGroup {
    fn compile(&mut self, threshold: usize) {
        if !self.routes.is_empty() && self.routes.len() > threshold {
            self.greedy = GreedyMatcher::build(&self.routes);
        }
    }

    /// Routes matching `path`, in registration order.
    fn candidates(&self, path: &str) -> SmallVec<[&Arc<Route>; 4]> {
        match &self.greedy {
            Some(greedy) => greedy
                .matching(path)
                .filter_map(|i| self.routes.get(i))
                .filter(|route| route.matches(path))
                .collect(),
            None => self.routes.iter().filter(|route| route.matches(path)).collect(),
        }
    }
}

enum Attempt {
    Found(RouteMatch),
    Cascade(VersionError),
    Reject(VersionError),
    Skip,
}

/// Routes grouped by method, tried in registration order within a group.
///
/// A request is matched against its own method's routes, then (for `HEAD`)
/// the `GET` routes, then `ANY` routes. A route whose versioner refuses the
/// request with a cascading error hands over to the next candidate.
///
/// Groups with more routes than the configured threshold are matched through
/// one combined regex set; results are identical to sequential scanning.
#[derive(Debug, Clone)]
pub struct Router {
    routes: Vec<Arc<Route>>,
    by_method: HashMap<Method, MethodGroup>,
    any: MethodGroup,
    route_head: bool,
}

impl Router {
    /// Builds a router configured from the environment.
    pub fn new(routes: Vec<Route>) -> Self {
        Self::with_config(routes, &RuntimeConfig::from_env())
    }

    pub fn with_config(routes: Vec<Route>, config: &RuntimeConfig) -> Self {
        let routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();
        let mut by_method: HashMap<Method, MethodGroup> = HashMap::new();
        let mut any = MethodGroup::default();
        for route in &routes {
            match route.method() {
                RouteMethod::Any => any.routes.push(Arc::clone(route)),
                RouteMethod::Only(method) => by_method
                    .entry(method.clone())
                    .or_default()
                    .routes
                    .push(Arc::clone(route)),
            }
        }
        for group in by_method.values_mut() {
            group.compile(config.greedy_threshold);
        }
        any.compile(config.greedy_threshold);

        let greedy_groups = by_method.values().filter(|g| g.greedy.is_some()).count()
            + usize::from(any.greedy.is_some());
        let routes_summary: Vec<String> = routes
            .iter()
            .take(10)
            .map(|r| format!("{} {}", r.method(), r.pattern().origin()))
            .collect();
        info!(
            routes_count = routes.len(),
            method_groups = by_method.len(),
            greedy_groups,
            greedy_threshold = config.greedy_threshold,
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );

        Self {
            routes,
            by_method,
            any,
            route_head: config.route_head,
        }
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// One line per route: method, template, handler.
    pub fn dump_routes(&self) -> Vec<String> {
        self.routes
            .iter()
            .map(|route| {
                let greedy = match route.method() {
                    RouteMethod::Any => self.any.greedy.is_some(),
                    RouteMethod::Only(m) => self.by_method.get(m).is_some_and(|g| g.greedy.is_some()),
                };
                format!(
                    "{:<7} {} -> {}{}",
                    route.method().to_string(),
                    route.pattern().source(),
                    route.handler(),
                    if greedy { " [combined]" } else { "" }
                )
            })
            .collect()
    }

    /// Routes `method path` with no headers or query.
    pub fn route(&self, method: Method, path: &str) -> RouteLookup {
        self.recognize(&RequestParts::new(method, path))
    }

    pub fn recognize(&self, request: &RequestParts) -> RouteLookup {
        let method = request.effective_method();
        let path = normalize_path(&request.path);
        let started = Instant::now();
        debug!(method = %method, path = %path, "Route match attempt");

        let mut groups: SmallVec<[&MethodGroup; 3]> = SmallVec::new();
        groups.extend(self.by_method.get(&method));
        if method == Method::HEAD && self.route_head {
            groups.extend(self.by_method.get(&Method::GET));
        }
        groups.push(&self.any);

        let mut cascaded: Option<VersionError> = None;
        for group in groups {
            for route in group.candidates(&path) {
                match attempt(route, request, &path) {
                    Attempt::Found(found) => {
                        info!(
                            method = %method,
                            path = %path,
                            handler_name = %found.route.handler(),
                            route_pattern = %found.route.pattern().source(),
                            path_params = ?found.path_params,
                            version = ?found.version(),
                            duration_us = started.elapsed().as_micros(),
                            "Route matched"
                        );
                        return RouteLookup::Found(found);
                    }
                    Attempt::Cascade(error) => cascaded = Some(error),
                    Attempt::Reject(error) => return RouteLookup::Rejected(error),
                    Attempt::Skip => {}
                }
            }
        }

        if let Some(error) = cascaded {
            debug!(method = %method, path = %path, status = error.status, "All candidate routes refused the version");
            return RouteLookup::Rejected(error);
        }

        let allowed = self.allowed_methods_for(&path, &method);
        if !allowed.is_empty() {
            debug!(method = %method, path = %path, allowed = ?allowed, "Method not allowed");
            return RouteLookup::MethodNotAllowed { allowed };
        }

        warn!(
            method = %method,
            path = %path,
            duration_us = started.elapsed().as_micros(),
            "No route matched"
        );
        RouteLookup::NotFound
    }

    /// Methods with at least one route matching `path`.
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        let path = normalize_path(path);
        let mut allowed: Vec<Method> = self
            .by_method
            .iter()
            .filter(|(_, group)| !group.candidates(&path).is_empty())
            .map(|(method, _)| method.clone())
            .collect();
        if self.route_head && allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }

    fn allowed_methods_for(&self, path: &str, method: &Method) -> Vec<Method> {
        let mut allowed = self.allowed_methods(path);
        allowed.retain(|m| m != method);
        allowed
    }
}

fn attempt(route: &Arc<Route>, request: &RequestParts, path: &str) -> Attempt {
    let Some(path_params) = route.path_params(path) else {
        return Attempt::Skip;
    };
    let version = match route.versioner() {
        Some(versioner) => match versioner.resolve(request) {
            Ok(state) => Some(state),
            Err(error) if error.cascade => return Attempt::Cascade(error),
            Err(error) => return Attempt::Reject(error),
        },
        None => None,
    };
    Attempt::Found(RouteMatch {
        route: Arc::clone(route),
        path_params,
        version,
    })
}
