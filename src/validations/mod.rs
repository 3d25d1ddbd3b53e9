//! # Parameter Validation
//!
//! A [`ParamsTree`] is the compiled parameter contract of one endpoint: a tree
//! of [`ParamScope`]s mirroring the nesting of the expected input, each holding
//! the validators for its directly declared parameters.
//!
//! ## Validation order
//!
//! Validation is depth-first. For each scope and each element it applies to:
//!
//! 1. presence checks for required parameters,
//! 2. type coercion,
//! 3. defaults,
//! 4. every other validator in declaration order (values, regexp, relational, custom),
//! 5. nested scopes, once per array member for array groups.
//!
//! A parameter that fails presence or coercion is not seen by later validators
//! or by its nested scope. Optional groups whose input is blank are skipped
//! entirely.
//!
//! ## Concurrency
//!
//! Trees are immutable once built and may be shared (`Arc<ParamsTree>`) across
//! any number of threads. Each call to [`ParamsTree::validate`] works on its own
//! copy of the input and its own error list.

mod builder;
mod engine;
pub mod errors;
mod registry;
mod scope;
pub mod validators;

pub use builder::{ParamDecl, ParamsBuilder, ScopeBuilder};
pub use errors::{FieldPath, PathSegment, ValidationError, ValidationErrors};
pub use registry::{ValidatorFactory, ValidatorRegistry, ValidatorSpec};
pub use scope::{DeclaredParam, Dependency, GroupKind, ParamScope, ScopeId};
pub use validators::{Rejection, ValueSet, Validator, ValidatorOptions};

pub(crate) use registry::value_set_from_options;

use crate::error::SchemaError;
use crate::runtime_config::RuntimeConfig;
use engine::Pass;
use serde_json::{Map, Value};
use tracing::debug;

/// Request-independent switches for the validation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Report required fields of a present-but-empty array group at index `0`.
    pub empty_array_placeholder: bool,
}

impl ValidationOptions {
    pub fn from_env() -> Self {
        Self::from(&RuntimeConfig::from_env())
    }
}

impl From<&RuntimeConfig> for ValidationOptions {
    fn from(config: &RuntimeConfig) -> Self {
        Self {
            empty_array_placeholder: config.empty_array_placeholder,
        }
    }
}

/// Declared-parameter shape: plain names, or a name with its nested shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declared {
    Name(String),
    Nested(String, Vec<Declared>),
}

impl Declared {
    /// `"a"` or `{"items": ["key"]}`.
    pub fn to_json(&self) -> Value {
        match self {
            Declared::Name(name) => Value::String(name.clone()),
            Declared::Nested(name, children) => {
                let mut map = Map::new();
                map.insert(
                    name.clone(),
                    Value::Array(children.iter().map(Declared::to_json).collect()),
                );
                Value::Object(map)
            }
        }
    }
}

/// Immutable validation tree for one endpoint.
#[derive(Debug)]
pub struct ParamsTree {
    scopes: Vec<ParamScope>,
    options: ValidationOptions,
}

impl ParamsTree {
    /// Builds a tree with the global validator registry and default options.
    pub fn build<F>(declare: F) -> Result<Self, SchemaError>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), SchemaError>,
    {
        ParamsBuilder::new().build(declare)
    }

    /// Tree with no declared parameters: every input is accepted unchanged.
    pub fn empty() -> Self {
        Self::from_parts(vec![ParamScope::root()], ValidationOptions::default())
    }

    pub fn builder() -> ParamsBuilder {
        ParamsBuilder::new()
    }

    pub(crate) fn from_parts(scopes: Vec<ParamScope>, options: ValidationOptions) -> Self {
        Self { scopes, options }
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    pub fn root(&self) -> &ParamScope {
        &self.scopes[ScopeId::ROOT.0]
    }

    pub fn scope(&self, id: ScopeId) -> Option<&ParamScope> {
        self.scopes.get(id.0)
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &ParamScope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }

    /// Full bracketed name of `name` declared in `scope`, with `indices`
    /// filling array ancestors from the outermost down.
    pub fn full_name(&self, scope: ScopeId, name: &str, indices: &[usize]) -> FieldPath {
        scope::full_name(&self.scopes, scope, name, indices)
    }

    /// Validates and coerces `input` with the tree's own options.
    pub fn validate(&self, input: Value) -> Result<Value, ValidationErrors> {
        self.validate_with(input, self.options)
    }

    /// Validates and coerces `input`. On success the returned object holds the
    /// coerced values and defaults; otherwise every distinct failure is returned.
    pub fn validate_with(&self, input: Value, options: ValidationOptions) -> Result<Value, ValidationErrors> {
        let mut params = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut pass = Pass::new(&self.scopes, options);
        pass.run_scope(ScopeId::ROOT, &mut params, &FieldPath::root());
        let errors = pass.finish();
        debug!(error_count = errors.len(), "Validation pass complete");
        if errors.is_empty() {
            Ok(Value::Object(params))
        } else {
            Err(errors)
        }
    }

    /// Declared-parameter shape of the whole tree.
    pub fn declared_params(&self) -> Vec<Declared> {
        self.declared_shape(ScopeId::ROOT)
    }

    fn declared_shape(&self, id: ScopeId) -> Vec<Declared> {
        self.level(id)
            .into_iter()
            .map(|param| match param.child {
                Some(child) => Declared::Nested(param.name.clone(), self.declared_shape(child)),
                None => Declared::Name(param.name.clone()),
            })
            .collect()
    }

    /// Parameters declared at `id`'s level, including those of lateral
    /// (`given`) blocks, which share the level.
    fn level(&self, id: ScopeId) -> Vec<&DeclaredParam> {
        let Some(scope) = self.scope(id) else {
            return Vec::new();
        };
        let mut params: Vec<&DeclaredParam> = scope.declared.iter().collect();
        for &child in &scope.children {
            if self.scope(child).is_some_and(ParamScope::is_lateral) {
                params.extend(self.level(child));
            }
        }
        params
    }

    /// Filters `params` down to declared keys, applying `as` renames. With
    /// `include_missing`, declared-but-absent keys appear as `null` (nested
    /// hashes as objects, nested arrays as `[]`).
    pub fn declared(&self, params: &Value, include_missing: bool) -> Value {
        let empty = Map::new();
        let map = params.as_object().unwrap_or(&empty);
        Value::Object(self.declared_level(ScopeId::ROOT, map, include_missing))
    }

    fn declared_level(&self, id: ScopeId, params: &Map<String, Value>, include_missing: bool) -> Map<String, Value> {
        let mut out = Map::new();
        for param in self.level(id) {
            let key = param.output_name().to_string();
            let value = params.get(&param.name);
            let rendered = match (param.child, value) {
                (Some(child), Some(Value::Array(items))) => Some(Value::Array(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::Object(m) => Value::Object(self.declared_level(child, m, include_missing)),
                            other => other.clone(),
                        })
                        .collect(),
                )),
                (Some(child), Some(Value::Object(m))) => {
                    Some(Value::Object(self.declared_level(child, m, include_missing)))
                }
                (_, Some(v)) => Some(v.clone()),
                (Some(child), None) if include_missing => {
                    match self.scope(child).and_then(ParamScope::group) {
                        Some(GroupKind::Array) => Some(Value::Array(Vec::new())),
                        _ => Some(Value::Object(self.declared_level(child, &Map::new(), true))),
                    }
                }
                (None, None) if include_missing => Some(Value::Null),
                _ => None,
            };
            if let Some(rendered) = rendered {
                out.insert(key, rendered);
            }
        }
        out
    }
}
