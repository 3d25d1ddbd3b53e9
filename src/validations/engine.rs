use super::errors::{FieldPath, ValidationError, ValidationErrors};
use super::scope::{ParamScope, ScopeId};
use super::validators::{is_blank, Phase, Validator};
use super::ValidationOptions;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Per-request walk over an immutable scope arena.
pub(crate) struct Pass<'t> {
    scopes: &'t [ParamScope],
    options: ValidationOptions,
    errors: ValidationErrors,
}

impl<'t> Pass<'t> {
    pub(crate) fn new(scopes: &'t [ParamScope], options: ValidationOptions) -> Self {
        Self {
            scopes,
            options,
            errors: ValidationErrors::new(),
        }
    }

    pub(crate) fn finish(self) -> ValidationErrors {
        self.errors
    }

    /// Validates one element (an object, or one member of an array group)
    /// against `id`, then descends into its child scopes.
    pub(crate) fn run_scope(&mut self, id: ScopeId, params: &mut Map<String, Value>, path: &FieldPath) {
        let scopes = self.scopes;
        let Some(scope) = scopes.get(id.0) else {
            return;
        };
        let mut failed: HashSet<&str> = HashSet::new();

        for validator in &scope.validators {
            if validator.relational() {
                if let Err(failure) = validator.validate_relation(params) {
                    let paths = failure.attributes.iter().map(|a| path.key(a)).collect();
                    self.record(paths, failure.rejection);
                }
                continue;
            }
            for attr in validator.attributes() {
                if failed.contains(attr.as_str()) || !applies(validator.as_ref(), attr, params) {
                    continue;
                }
                if let Err(rejection) = validator.validate_param(attr, params) {
                    self.record(vec![path.key(attr)], rejection);
                    if validator.phase() < Phase::Default || validator.options().fail_fast {
                        failed.insert(attr.as_str());
                    }
                }
            }
        }

        for &child in &scope.children {
            self.descend(child, params, path, &failed);
        }
    }

    fn descend(&mut self, id: ScopeId, params: &mut Map<String, Value>, path: &FieldPath, failed: &HashSet<&str>) {
        let scopes = self.scopes;
        let Some(scope) = scopes.get(id.0) else {
            return;
        };
        let Some(element) = scope.element.as_deref() else {
            // Lateral: same element, same path, gated by its dependencies.
            if scope.meets_dependency(params) {
                self.run_scope(id, params, path);
            }
            return;
        };
        if failed.contains(element) {
            return;
        }
        let Some(slice) = params.get_mut(element) else {
            return;
        };
        if scope.optional && is_blank(slice) {
            return;
        }
        let element_path = path.key(element);
        match slice {
            Value::Array(items) if items.is_empty() => {
                if self.options.empty_array_placeholder {
                    let mut placeholder = Map::new();
                    self.run_scope(id, &mut placeholder, &element_path.index(0));
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter_mut().enumerate() {
                    let item_path = element_path.index(index);
                    match item {
                        Value::Object(map) => self.run_scope(id, map, &item_path),
                        _ => {
                            let mut empty = Map::new();
                            self.run_scope(id, &mut empty, &item_path);
                        }
                    }
                }
            }
            Value::Object(map) => self.run_scope(id, map, &element_path),
            _ => {}
        }
    }

    fn record(&mut self, params: Vec<FieldPath>, rejection: super::validators::Rejection) {
        self.errors.push(ValidationError {
            params,
            message: rejection.message,
            status: rejection.status,
            headers: rejection.headers,
        });
    }
}

/// Presence always runs and defaults fill missing keys; every other validator
/// needs a required attribute or a present key.
fn applies(validator: &dyn Validator, attr: &str, params: &Map<String, Value>) -> bool {
    matches!(validator.phase(), Phase::Presence | Phase::Default)
        || validator.options().required
        || params.contains_key(attr)
}
