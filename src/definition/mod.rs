//! # API Definitions
//!
//! Declarative YAML or JSON description of an API: its routes, their
//! parameter contracts, versioning and content types. [`build_dispatcher`]
//! compiles a definition into a [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! ```yaml
//! name: pets
//! prefix: api
//! version:
//!   using: path
//!   versions: [v1]
//! routes:
//!   - method: GET
//!     path: /pets/:id
//!     handler: show_pet
//!     requirements: { id: '\d+' }
//!     params:
//!       - { name: id, required: true, type: Integer }
//!       - name: filter
//!         type: Hash
//!         params:
//!           - { name: color, values: [black, white] }
//! ```
//!
//! Parameters with nested `params`, `given` or `relations` are groups.
//! `given` blocks take `depends_on` entries of the form `name`,
//! `{param, equals}` or `{param, in: [...]}`.

mod build;
mod load;
mod types;

pub use build::build_dispatcher;
pub use load::{load_definition, load_dispatcher};
pub use types::{
    ApiDefinition, ContentTypeDef, DependencyDef, GivenDef, LengthDef, ParamDef, RelationDef, RouteDef, ScopeDef,
};
