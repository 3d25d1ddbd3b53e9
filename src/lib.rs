//! # paramgate
//!
//! **paramgate** is a request gate for HTTP APIs: it routes a request to an
//! endpoint, resolves the API version, negotiates the response format and
//! validates and coerces the endpoint's parameters against a declared
//! contract, before any handler code runs.
//!
//! ## Architecture
//!
//! - **[`validations`]** - Nested parameter scopes, validators and the validation engine
//! - **[`coerce`]** - Type descriptors and string-to-value coercion
//! - **[`router`]** - Route patterns and method/path resolution
//! - **[`versioner`]** - Path, header, parameter and `Accept-Version` versioning
//! - **[`format`]** - Content types and response format negotiation
//! - **[`dispatcher`]** - The full request pipeline
//! - **[`definition`]** - YAML/JSON API definitions compiled into a dispatcher
//! - **[`request`]** - Transport-neutral request parts and nested query parsing
//! - **[`cli`]** - The `paramgate` command
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Dispatcher
//!     participant Router
//!     participant Versioner
//!     participant Format as ContentTypes
//!     participant Params as ParamsTree
//!
//!     Host->>Dispatcher: dispatch(RequestParts)
//!     Dispatcher->>Router: recognize(request)
//!     Router->>Router: candidates in registration order
//!     Router->>Versioner: resolve(request)
//!     alt version rejected with cascade
//!         Versioner-->>Router: try next candidate
//!     end
//!     alt no route
//!         Router-->>Host: 404 / 405 with Allow
//!     end
//!     Router-->>Dispatcher: RouteMatch
//!     Dispatcher->>Format: negotiate(extension, format, Accept)
//!     alt unsupported
//!         Format-->>Host: 406
//!     end
//!     Dispatcher->>Params: validate(query < body < path)
//!     alt invalid
//!         Params-->>Host: 400 with grouped messages
//!     end
//!     Dispatcher-->>Host: Dispatched(route, coerced params, version, format)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use http::Method;
//! use paramgate::coerce::TypeDescriptor;
//! use paramgate::dispatcher::Dispatcher;
//! use paramgate::request::RequestParts;
//! use paramgate::router::{Route, Router};
//! use paramgate::validations::{ParamDecl, ParamsTree};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let params = ParamsTree::build(|root| {
//!     root.requires("id", ParamDecl::of(TypeDescriptor::integer()))?;
//!     Ok(())
//! })?;
//! let route = Route::parse("GET", "/pets/:id(.:format)", "show_pet")?.with_params(Arc::new(params));
//! let dispatcher = Dispatcher::new(Router::new(vec![route]));
//!
//! let dispatched = dispatcher
//!     .dispatch(&RequestParts::from_uri(Method::GET, "/pets/42"))
//!     .map_err(|e| e.to_string())?;
//! assert_eq!(dispatched.handler(), "show_pet");
//! assert_eq!(dispatched.params, json!({"id": 42}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Concurrency
//!
//! Parameter trees, routers and dispatchers are immutable after
//! construction and can be shared across threads behind an `Arc`. Each
//! request works on its own copy of the input.
//!
//! ## Configuration
//!
//! Behavior switches are read from `PARAMGATE_*` environment variables; see
//! [`runtime_config`] and [`logging`].

pub mod accept;
pub mod cli;
pub mod coerce;
pub mod definition;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod logging;
pub mod request;
pub mod router;
pub mod runtime_config;
pub mod validations;
pub mod versioner;

pub use definition::{build_dispatcher, load_definition, load_dispatcher, ApiDefinition};
pub use dispatcher::{DispatchError, Dispatched, Dispatcher};
pub use error::SchemaError;
pub use request::RequestParts;
pub use validations::{ParamDecl, ParamsTree, ValidationErrors};
