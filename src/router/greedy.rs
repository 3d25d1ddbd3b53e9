use super::route::Route;
use regex::RegexSet;
use std::sync::Arc;
use tracing::warn;

/// Every route of one method group compiled into a single [`RegexSet`].
///
/// One scan reports all matching routes; indices come back ascending, which
/// is registration order, so callers see the same candidates a sequential
/// scan would.
#[derive(Debug, Clone)]
pub(crate) struct GreedyMatcher {
    set: RegexSet,
}

impl GreedyMatcher {
    /// `None` when the combined set cannot be compiled (size limits); the
    /// group then falls back to scanning.
    pub(crate) fn build(routes: &[Arc<Route>]) -> Option<Self> {
        let sources = routes.iter().map(|route| route_source(route));
        match RegexSet::new(sources) {
            Ok(set) => Some(Self { set }),
            Err(error) => {
                warn!(
                    routes_count = routes.len(),
                    error = %error,
                    "Combined route matcher unavailable, using sequential matching"
                );
                None
            }
        }
    }

    pub(crate) fn matching(&self, path: &str) -> impl Iterator<Item = usize> {
        self.set.matches(path).into_iter()
    }
}

fn route_source(route: &Route) -> String {
    if route.forward_match() {
        format!("^{}", regex::escape(route.pattern().origin()))
    } else {
        route.pattern().source().to_string()
    }
}
