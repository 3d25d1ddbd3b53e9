//! # Router Module
//!
//! Matches an incoming method and path to one of the registered [`Route`]s
//! and extracts its path parameters.
//!
//! ## Overview
//!
//! - [`RoutePath`] assembles a route template from mount path, prefix,
//!   version segment, namespace and format suffix.
//! - [`RoutePattern`] compiles a template (`/users/:id(.:format)`) to a regex
//!   plus the ordered list of its named captures.
//! - [`Router`] groups routes by method and resolves a request to a
//!   [`RouteLookup`]: found, method not allowed, version rejected, or not found.
//!
//! Within a method group the first route that matches wins, in registration
//! order. When a route's versioner refuses the request with `X-Cascade: pass`
//! the next matching route is tried.
//!
//! ## Example
//!
//! ```rust
//! use http::Method;
//! use paramgate::router::{Route, RouteLookup, Router};
//! use paramgate::runtime_config::RuntimeConfig;
//!
//! # fn main() -> Result<(), paramgate::error::SchemaError> {
//! let router = Router::with_config(
//!     vec![
//!         Route::parse("GET", "/pets/:id(.:format)", "show_pet")?,
//!         Route::parse("POST", "/pets(.:format)", "create_pet")?,
//!     ],
//!     &RuntimeConfig::default(),
//! );
//!
//! match router.route(Method::GET, "/pets/7.json") {
//!     RouteLookup::Found(m) => {
//!         assert_eq!(m.handler(), "show_pet");
//!         assert_eq!(m.get_path_param("id"), Some("7"));
//!         assert_eq!(m.get_path_param("format"), Some("json"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! assert!(matches!(
//!     router.route(Method::DELETE, "/pets/7"),
//!     RouteLookup::MethodNotAllowed { .. }
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! ## Combined matching
//!
//! Method groups larger than `PARAMGATE_GREEDY_THRESHOLD` routes are matched
//! through one `RegexSet` per group. It reports every matching route in one
//! pass, so cascading and first-match order behave exactly as with sequential
//! scanning.

mod core;
mod greedy;
mod path;
mod pattern;
mod route;

pub use core::{ParamVec, RouteLookup, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use path::{normalize_path, RoutePath};
pub use pattern::RoutePattern;
pub use route::{Route, RouteMethod};
