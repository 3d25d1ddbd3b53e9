use super::{Rejection, Validator, ValidatorOptions};
use serde_json::{Map, Value};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

static NULL: Value = Value::Null;

type Check = dyn Fn(&Value) -> Result<(), Rejection> + Send + Sync;

/// User-supplied check on a single attribute value.
///
/// A panicking check is reported as a rejection with the validator's message.
#[derive(Clone)]
pub struct PredicateValidator {
    name: String,
    attributes: Vec<String>,
    options: ValidatorOptions,
    check: Arc<Check>,
}

impl PredicateValidator {
    /// Boolean predicate; `false` rejects with `message`.
    pub fn new<F>(
        name: impl Into<String>,
        attributes: Vec<String>,
        options: ValidatorOptions,
        message: impl Into<String>,
        predicate: F,
    ) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let options = options.with_message(Some(message.into()));
        let rejection = options.reject("is invalid");
        Self::with_check(name, attributes, options, move |value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(rejection.clone())
            }
        })
    }

    /// Full check that builds its own rejection, status and headers included.
    pub fn with_check<F>(
        name: impl Into<String>,
        attributes: Vec<String>,
        options: ValidatorOptions,
        check: F,
    ) -> Self
    where
        F: Fn(&Value) -> Result<(), Rejection> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            attributes,
            options,
            check: Arc::new(check),
        }
    }
}

impl PredicateValidator {
    /// Copy bound to `attributes`, keeping this validator's message.
    pub(crate) fn bind(&self, attributes: Vec<String>, options: ValidatorOptions) -> Self {
        Self {
            name: self.name.clone(),
            attributes,
            options: options.with_message(self.options.message.clone()),
            check: Arc::clone(&self.check),
        }
    }
}

impl fmt::Debug for PredicateValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateValidator")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl Validator for PredicateValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn validate_param(&self, attr: &str, params: &mut Map<String, Value>) -> Result<(), Rejection> {
        let value = params.get(attr).unwrap_or(&NULL);
        match catch_unwind(AssertUnwindSafe(|| (self.check)(value))) {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(validator = %self.name, attribute = attr, "Custom validator panicked");
                Err(self.options.reject("is invalid"))
            }
        }
    }
}
