//! Declaration API that produces an immutable [`ParamsTree`].
//!
//! ```rust
//! use paramgate::coerce::TypeDescriptor;
//! use paramgate::validations::{ParamDecl, ParamsTree};
//!
//! let tree = ParamsTree::build(|root| {
//!     root.requires("name", ParamDecl::of(TypeDescriptor::string()))?;
//!     root.requires_group("items", ParamDecl::of(TypeDescriptor::array()), |items| {
//!         items.requires("key", ParamDecl::new())?;
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! # Ok::<(), paramgate::error::SchemaError>(())
//! ```
//!
//! Every authoring mistake is reported as a [`SchemaError`] from the call that
//! made it.

use super::registry::{ValidatorRegistry, ValidatorSpec};
use super::scope::{DeclaredParam, Dependency, GroupKind, ParamScope, ScopeId};
use super::validators::{
    AllowBlankValidator, CoerceValidator, CoerceWith, DefaultValidator, LengthValidator,
    PredicateValidator, PresenceValidator, RegexpValidator, Relation, RelationalValidator,
    Rejection, SameAsValidator, Validator, ValidatorOptions, ValueSet, ValuesValidator,
};
use super::{ParamsTree, ValidationOptions};
use crate::coerce::{InvalidValue, Primitive, TypeDescriptor};
use crate::error::SchemaError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Options for one `requires` / `optional` declaration.
#[derive(Clone, Default)]
pub struct ParamDecl {
    ty: Option<TypeDescriptor>,
    types: Option<Vec<TypeDescriptor>>,
    coerce_with: Option<CoerceWith>,
    values: Option<ValueSet>,
    except_values: Option<ValueSet>,
    default: Option<Value>,
    allow_blank: Option<bool>,
    regexp: Option<String>,
    length: Option<(Option<usize>, Option<usize>, Option<usize>)>,
    same_as: Option<String>,
    fail_fast: bool,
    as_name: Option<String>,
    desc: Option<String>,
    messages: HashMap<String, String>,
    custom: Vec<(String, Value)>,
    predicates: Vec<PredicateValidator>,
}

impl ParamDecl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declaration with a type.
    pub fn of(ty: TypeDescriptor) -> Self {
        Self::new().ty(ty)
    }

    pub fn ty(mut self, ty: TypeDescriptor) -> Self {
        self.ty = Some(ty);
        self
    }

    /// The value may be any of `types`, tried in order.
    pub fn types(mut self, types: Vec<TypeDescriptor>) -> Self {
        self.types = Some(types);
        self
    }

    pub fn coerce_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, InvalidValue> + Send + Sync + 'static,
    {
        self.coerce_with = Some(CoerceWith::new(f));
        self
    }

    /// Message for coercion failures.
    pub fn coerce_message(self, message: impl Into<String>) -> Self {
        self.message("coerce", message)
    }

    pub fn values(mut self, values: ValueSet) -> Self {
        self.values = Some(values);
        self
    }

    pub fn except_values(mut self, values: ValueSet) -> Self {
        self.except_values = Some(values);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = Some(allow);
        self
    }

    pub fn regexp(mut self, pattern: impl Into<String>) -> Self {
        self.regexp = Some(pattern.into());
        self
    }

    pub fn length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        self.length = Some((min, max, None));
        self
    }

    pub fn length_is(mut self, len: usize) -> Self {
        self.length = Some((None, None, Some(len)));
        self
    }

    pub fn same_as(mut self, other: impl Into<String>) -> Self {
        self.same_as = Some(other.into());
        self
    }

    pub fn fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Key used for this parameter in [`ParamsTree::declared`] output.
    pub fn as_name(mut self, name: impl Into<String>) -> Self {
        self.as_name = Some(name.into());
        self
    }

    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Replaces the message of the validator called `validator`
    /// (`"presence"`, `"values"`, `"regexp"`, ...).
    pub fn message(mut self, validator: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(validator.into(), message.into());
        self
    }

    /// Validator looked up by name in the builder's registry.
    pub fn validate(mut self, validator: impl Into<String>, options: Value) -> Self {
        self.custom.push((validator.into(), options));
        self
    }

    /// Inline predicate; `false` rejects the value with `message`.
    pub fn validate_with<F>(mut self, message: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(PredicateValidator::new(
            "predicate",
            Vec::new(),
            ValidatorOptions::default(),
            message,
            predicate,
        ));
        self
    }

    /// Inline check producing its own rejection.
    pub fn validate_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        self.predicates.push(PredicateValidator::with_check(
            "predicate",
            Vec::new(),
            ValidatorOptions::default(),
            check,
        ));
        self
    }

    fn declared_type(&self) -> Option<TypeDescriptor> {
        match (&self.ty, &self.types) {
            (Some(ty), _) => Some(ty.clone()),
            (None, Some(types)) => Some(TypeDescriptor::Multiple(types.clone())),
            (None, None) => None,
        }
    }

    fn check(&self) -> Result<(), SchemaError> {
        if self.ty.is_some() && self.types.is_some() {
            return Err(SchemaError::TypeWithTypes);
        }
        if self.coerce_with.is_some() {
            match self.declared_type() {
                None => return Err(SchemaError::CoerceWithoutType),
                Some(ty) if ty.is_json() => {
                    return Err(SchemaError::CoerceWithDisallowed(ty.signature()))
                }
                Some(_) => {}
            }
        }
        let value_type = self.ty.as_ref().and_then(TypeDescriptor::value_type);
        for (option, set) in [("values", &self.values), ("except_values", &self.except_values)] {
            if let (Some(ty), Some(ValueSet::List(list))) = (value_type, set) {
                if !list.iter().all(|v| accepts_option_value(ty, v)) {
                    return Err(SchemaError::incompatible(
                        "type",
                        ty,
                        option,
                        Value::Array(list.clone()),
                    ));
                }
            }
        }
        if let Some(default) = &self.default {
            let defaults: Vec<&Value> = match default {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            if let Some(values) = &self.values {
                if !matches!(values, ValueSet::Predicate(_))
                    && !defaults.iter().all(|d| values.contains(d))
                {
                    return Err(SchemaError::incompatible("default", default, "values", values));
                }
            }
            if let Some(except) = &self.except_values {
                if !matches!(except, ValueSet::Predicate(_))
                    && defaults.iter().any(|d| except.contains(d))
                {
                    return Err(SchemaError::incompatible(
                        "default",
                        default,
                        "except_values",
                        except,
                    ));
                }
            }
        }
        Ok(())
    }
}

fn accepts_option_value(ty: &TypeDescriptor, value: &Value) -> bool {
    match ty {
        TypeDescriptor::Primitive(Primitive::Float) => value.is_number(),
        TypeDescriptor::Primitive(Primitive::Date | Primitive::DateTime | Primitive::Time) => {
            value.is_string()
        }
        other => other.accepts_native(value),
    }
}

/// Configures and builds a [`ParamsTree`].
#[derive(Debug, Default)]
pub struct ParamsBuilder {
    registry: Option<Arc<ValidatorRegistry>>,
    options: ValidationOptions,
}

impl ParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry used for named validators; defaults to [`ValidatorRegistry::global`].
    pub fn registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs `declare` against the root scope and freezes the result.
    pub fn build<F>(self, declare: F) -> Result<ParamsTree, SchemaError>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), SchemaError>,
    {
        let registry = self.registry.unwrap_or_else(ValidatorRegistry::global);
        let mut scopes = vec![ParamScope::root()];
        {
            let mut root = ScopeBuilder {
                scopes: &mut scopes,
                id: ScopeId::ROOT,
                registry: &registry,
            };
            declare(&mut root)?;
        }
        for scope in &mut scopes {
            // Stable: declaration order is kept within each phase.
            scope.validators.sort_by_key(|v| v.phase());
        }
        Ok(ParamsTree::from_parts(scopes, self.options))
    }
}

/// Declares parameters inside one scope.
pub struct ScopeBuilder<'a> {
    scopes: &'a mut Vec<ParamScope>,
    id: ScopeId,
    registry: &'a Arc<ValidatorRegistry>,
}

impl ScopeBuilder<'_> {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    fn scope_mut(&mut self) -> &mut ParamScope {
        &mut self.scopes[self.id.0]
    }

    fn push_validator(&mut self, validator: Arc<dyn Validator>) {
        self.scope_mut().validators.push(validator);
    }

    /// Required parameter.
    pub fn requires(&mut self, name: &str, decl: ParamDecl) -> Result<&mut Self, SchemaError> {
        self.declare(name, true, decl, None)?;
        Ok(self)
    }

    /// Optional parameter.
    pub fn optional(&mut self, name: &str, decl: ParamDecl) -> Result<&mut Self, SchemaError> {
        self.declare(name, false, decl, None)?;
        Ok(self)
    }

    /// Required group. The type must be `Array`, `Hash`, `JSON` or `Array[JSON]`.
    pub fn requires_group<F>(&mut self, name: &str, decl: ParamDecl, nested: F) -> Result<&mut Self, SchemaError>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), SchemaError>,
    {
        self.group(name, true, decl, nested)
    }

    /// Optional group. Without a type the group is an `Array`.
    pub fn optional_group<F>(&mut self, name: &str, decl: ParamDecl, nested: F) -> Result<&mut Self, SchemaError>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), SchemaError>,
    {
        self.group(name, false, decl, nested)
    }

    /// Conditional block at this scope's level, validated only when every
    /// dependency holds for the current element.
    pub fn given<I, F>(&mut self, dependencies: I, nested: F) -> Result<&mut Self, SchemaError>
    where
        I: IntoIterator<Item = Dependency>,
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), SchemaError>,
    {
        let group = self.scopes[self.id.0].group;
        let child = self.open_scope(ParamScope {
            element: None,
            parent: Some(self.id),
            optional: false,
            group,
            dependent_on: dependencies.into_iter().collect(),
            ..ParamScope::root()
        });
        self.nest(child, nested)?;
        Ok(self)
    }

    pub fn mutually_exclusive(&mut self, attrs: &[&str]) -> Result<&mut Self, SchemaError> {
        self.relation(Relation::MutuallyExclusive, attrs, None)
    }

    pub fn exactly_one_of(&mut self, attrs: &[&str]) -> Result<&mut Self, SchemaError> {
        self.relation(Relation::ExactlyOneOf, attrs, None)
    }

    pub fn at_least_one_of(&mut self, attrs: &[&str]) -> Result<&mut Self, SchemaError> {
        self.relation(Relation::AtLeastOneOf, attrs, None)
    }

    pub fn all_or_none_of(&mut self, attrs: &[&str]) -> Result<&mut Self, SchemaError> {
        self.relation(Relation::AllOrNoneOf, attrs, None)
    }

    /// Relational constraint with a custom message.
    pub fn relation(
        &mut self,
        relation: Relation,
        attrs: &[&str],
        message: Option<String>,
    ) -> Result<&mut Self, SchemaError> {
        let options = ValidatorOptions::default().with_message(message);
        let validator = RelationalValidator::new(relation, to_owned(attrs), options)?;
        self.push_validator(Arc::new(validator));
        Ok(self)
    }

    /// Binds a registry validator to already-declared attributes.
    pub fn validates(&mut self, attrs: &[&str], validator: &str, options: Value) -> Result<&mut Self, SchemaError> {
        let required = attrs.iter().all(|a| {
            self.scopes[self.id.0]
                .declared
                .iter()
                .any(|d| d.name == *a && d.required)
        });
        let spec = ValidatorSpec {
            attributes: to_owned(attrs),
            options: &options,
            common: ValidatorOptions {
                required,
                ..ValidatorOptions::default()
            },
        };
        let built = self.registry.build(validator, spec)?;
        self.push_validator(built);
        Ok(self)
    }

    fn group<F>(&mut self, name: &str, required: bool, decl: ParamDecl, nested: F) -> Result<&mut Self, SchemaError>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), SchemaError>,
    {
        let ty = match decl.declared_type() {
            Some(ty) if ty.is_group() => ty,
            Some(_) => return Err(SchemaError::UnsupportedGroupType),
            None if required => return Err(SchemaError::MissingGroupType),
            None => TypeDescriptor::array(),
        };
        let kind = if ty.is_list_group() {
            GroupKind::Array
        } else {
            GroupKind::Hash
        };
        let child = self.open_scope(ParamScope {
            element: Some(name.to_string()),
            parent: Some(self.id),
            optional: !required,
            group: Some(kind),
            ..ParamScope::root()
        });
        self.declare(name, required, decl.ty(ty), Some(child))?;
        self.nest(child, nested)?;
        Ok(self)
    }

    fn open_scope(&mut self, scope: ParamScope) -> ScopeId {
        let child = ScopeId(self.scopes.len());
        self.scopes.push(scope);
        self.scope_mut().children.push(child);
        child
    }

    fn nest<F>(&mut self, child: ScopeId, nested: F) -> Result<(), SchemaError>
    where
        F: FnOnce(&mut ScopeBuilder<'_>) -> Result<(), SchemaError>,
    {
        let mut builder = ScopeBuilder {
            scopes: &mut *self.scopes,
            id: child,
            registry: self.registry,
        };
        nested(&mut builder)
    }

    fn declare(
        &mut self,
        name: &str,
        required: bool,
        decl: ParamDecl,
        child: Option<ScopeId>,
    ) -> Result<(), SchemaError> {
        decl.check()?;
        let ty = decl.declared_type();
        let attrs = vec![name.to_string()];
        let message = |key: &str| decl.messages.get(key).cloned();
        let common = ValidatorOptions {
            required,
            allow_blank: decl.allow_blank,
            fail_fast: decl.fail_fast,
            message: None,
        };

        self.scope_mut().declared.push(DeclaredParam {
            name: name.to_string(),
            rename: decl.as_name.clone(),
            required,
            type_name: ty.as_ref().map(TypeDescriptor::signature),
            desc: decl.desc.clone(),
            child,
        });

        if required {
            let options = common.clone().with_message(message("presence"));
            self.push_validator(Arc::new(PresenceValidator::new(attrs.clone(), options)));
        }
        if let Some(ty) = ty {
            let options = common.clone().with_message(message("coerce"));
            let validator = CoerceValidator::new(attrs.clone(), options, ty)
                .with_coerce_with(decl.coerce_with.clone());
            self.push_validator(Arc::new(validator));
        }
        if let Some(default) = &decl.default {
            self.push_validator(Arc::new(DefaultValidator::new(
                attrs.clone(),
                common.clone(),
                default.clone(),
            )));
        }
        if decl.allow_blank == Some(false) {
            let options = common.clone().with_message(message("allow_blank"));
            self.push_validator(Arc::new(AllowBlankValidator::new(attrs.clone(), options)));
        }
        if let Some(set) = &decl.values {
            let options = common.clone().with_message(message("values"));
            self.push_validator(Arc::new(ValuesValidator::values(attrs.clone(), options, set.clone())));
        }
        if let Some(set) = &decl.except_values {
            let options = common.clone().with_message(message("except_values"));
            self.push_validator(Arc::new(ValuesValidator::except_values(
                attrs.clone(),
                options,
                set.clone(),
            )));
        }
        if let Some(pattern) = &decl.regexp {
            let options = common.clone().with_message(message("regexp"));
            self.push_validator(Arc::new(RegexpValidator::new(attrs.clone(), options, pattern)?));
        }
        if let Some((min, max, is)) = decl.length {
            let options = common.clone().with_message(message("length"));
            self.push_validator(Arc::new(LengthValidator::new(attrs.clone(), options, min, max, is)?));
        }
        if let Some(other) = &decl.same_as {
            let options = common.clone().with_message(message("same_as"));
            self.push_validator(Arc::new(SameAsValidator::new(attrs.clone(), options, other.as_str())));
        }
        for (validator, options) in &decl.custom {
            let spec = ValidatorSpec {
                attributes: attrs.clone(),
                options,
                common: common.clone().with_message(message(validator.as_str())),
            };
            let built = self.registry.build(validator, spec)?;
            self.push_validator(built);
        }
        for predicate in &decl.predicates {
            self.push_validator(Arc::new(predicate.bind(attrs.clone(), common.clone())));
        }
        Ok(())
    }
}

fn to_owned(attrs: &[&str]) -> Vec<String> {
    attrs.iter().map(|a| (*a).to_string()).collect()
}
