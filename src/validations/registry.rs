//! # Validator Registry
//!
//! Maps validator names (`"presence"`, `"values"`, `"mutually_exclusive"`, ...) to
//! factories. Declarations that arrive as data, such as definition files and
//! [`ScopeBuilder::validates`](super::ScopeBuilder::validates), resolve their
//! validators here.
//!
//! Registration happens at startup; lookups afterwards are read-only. The map is
//! a [`DashMap`] so registration from several threads never blocks lookups.

use super::validators::{
    AllowBlankValidator, CoerceValidator, DefaultValidator, LengthValidator, PresenceValidator,
    RegexpValidator, Relation, RelationalValidator, SameAsValidator, ValueSet, Validator,
    ValidatorOptions, ValuesValidator,
};
use crate::coerce::TypeDescriptor;
use crate::error::SchemaError;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Everything a factory receives to build one validator.
#[derive(Debug, Clone)]
pub struct ValidatorSpec<'a> {
    pub attributes: Vec<String>,
    pub options: &'a Value,
    pub common: ValidatorOptions,
}

pub type ValidatorFactory =
    dyn Fn(ValidatorSpec<'_>) -> Result<Arc<dyn Validator>, SchemaError> + Send + Sync;

static GLOBAL: Lazy<Arc<ValidatorRegistry>> = Lazy::new(|| Arc::new(ValidatorRegistry::with_builtins()));

#[derive(Default)]
pub struct ValidatorRegistry {
    factories: DashMap<String, Arc<ValidatorFactory>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}

impl ValidatorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in validator.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register("presence", |spec| {
            Ok(Arc::new(PresenceValidator::new(spec.attributes, spec.common)))
        });
        registry.register("coerce", |spec| {
            let type_name = match spec.options {
                Value::String(s) => s.as_str(),
                other => other
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| SchemaError::invalid_options("coerce", "expected a type name"))?,
            };
            let descriptor: TypeDescriptor = type_name.parse()?;
            Ok(Arc::new(CoerceValidator::new(spec.attributes, spec.common, descriptor)))
        });
        registry.register("default", |spec| {
            Ok(Arc::new(DefaultValidator::new(
                spec.attributes,
                spec.common,
                spec.options.clone(),
            )))
        });
        registry.register("allow_blank", |spec| {
            Ok(Arc::new(AllowBlankValidator::new(spec.attributes, spec.common)))
        });
        registry.register("values", |spec| {
            let set = value_set_from_options("values", spec.options)?;
            Ok(Arc::new(ValuesValidator::values(spec.attributes, spec.common, set)))
        });
        registry.register("except_values", |spec| {
            let set = value_set_from_options("except_values", spec.options)?;
            Ok(Arc::new(ValuesValidator::except_values(
                spec.attributes,
                spec.common,
                set,
            )))
        });
        registry.register("regexp", |spec| {
            let pattern = spec
                .options
                .as_str()
                .ok_or_else(|| SchemaError::invalid_options("regexp", "expected a pattern string"))?;
            Ok(Arc::new(RegexpValidator::new(spec.attributes, spec.common, pattern)?))
        });
        registry.register("length", |spec| {
            let bound = |key: &str| -> Result<Option<usize>, SchemaError> {
                match spec.options.get(key) {
                    None | Some(Value::Null) => Ok(None),
                    Some(v) => v
                        .as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .map(Some)
                        .ok_or_else(|| {
                            SchemaError::invalid_options("length", format!("'{key}' must be a non-negative integer"))
                        }),
                }
            };
            let (min, max, is) = (bound("min")?, bound("max")?, bound("is")?);
            Ok(Arc::new(LengthValidator::new(
                spec.attributes,
                spec.common,
                min,
                max,
                is,
            )?))
        });
        registry.register("same_as", |spec| {
            let other = spec
                .options
                .as_str()
                .ok_or_else(|| SchemaError::invalid_options("same_as", "expected a parameter name"))?;
            Ok(Arc::new(SameAsValidator::new(spec.attributes, spec.common, other)))
        });
        for relation in [
            Relation::MutuallyExclusive,
            Relation::ExactlyOneOf,
            Relation::AtLeastOneOf,
            Relation::AllOrNoneOf,
        ] {
            registry.register(relation.name(), move |spec| {
                Ok(Arc::new(RelationalValidator::new(
                    relation,
                    spec.attributes,
                    spec.common,
                )?))
            });
        }
        registry
    }

    /// Shared registry used by builders that were not given one explicitly.
    pub fn global() -> Arc<ValidatorRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Registers (or replaces) the factory for `name`.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(ValidatorSpec<'_>) -> Result<Arc<dyn Validator>, SchemaError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(validator = %name, "Validator registered");
        self.factories.insert(name, Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Builds the validator registered under `name`.
    pub fn build(&self, name: &str, spec: ValidatorSpec<'_>) -> Result<Arc<dyn Validator>, SchemaError> {
        // Clone the factory out so the shard lock is released before it runs.
        let factory = self
            .factories
            .get(name)
            .map(|f| Arc::clone(f.value()))
            .ok_or_else(|| SchemaError::UnknownValidator(name.to_string()))?;
        factory(spec)
    }
}

/// `[a, b]` is a list; `{"min": x, "max": y}` is an inclusive range.
pub(crate) fn value_set_from_options(validator: &str, options: &Value) -> Result<ValueSet, SchemaError> {
    match options {
        Value::Array(list) => Ok(ValueSet::List(list.clone())),
        Value::Object(map) if map.contains_key("min") || map.contains_key("max") => {
            let bound = |key: &str| -> Result<Option<f64>, SchemaError> {
                match map.get(key) {
                    None | Some(Value::Null) => Ok(None),
                    Some(v) => v
                        .as_f64()
                        .map(Some)
                        .ok_or_else(|| SchemaError::invalid_options(validator, format!("'{key}' must be a number"))),
                }
            };
            Ok(ValueSet::Range {
                min: bound("min")?,
                max: bound("max")?,
            })
        }
        Value::Object(map) => match map.get("value") {
            Some(inner) => value_set_from_options(validator, inner),
            None => Err(SchemaError::invalid_options(validator, "expected a list or a min/max range")),
        },
        _ => Err(SchemaError::invalid_options(validator, "expected a list or a min/max range")),
    }
}
