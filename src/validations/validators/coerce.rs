use super::{Phase, Rejection, Validator, ValidatorOptions};
use crate::coerce::{build_coercer, Coercer, InvalidValue, TypeDescriptor};
use crate::validations::errors::messages;
use serde_json::{Map, Value};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type CoerceFn = dyn Fn(&Value) -> Result<Value, InvalidValue> + Send + Sync;

/// Custom conversion applied before the declared type's own coercion.
#[derive(Clone)]
pub struct CoerceWith(Arc<CoerceFn>);

impl CoerceWith {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, InvalidValue> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    fn apply(&self, raw: &Value) -> Result<Value, InvalidValue> {
        catch_unwind(AssertUnwindSafe(|| (self.0)(raw))).unwrap_or_else(|_| Err(InvalidValue::default()))
    }
}

impl fmt::Debug for CoerceWith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CoerceWith(..)")
    }
}

/// Replaces the attribute with its coerced value, or rejects it as invalid.
#[derive(Debug, Clone)]
pub struct CoerceValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
    descriptor: TypeDescriptor,
    coercer: Arc<Coercer>,
    coerce_with: Option<CoerceWith>,
}

impl CoerceValidator {
    pub fn new(attributes: Vec<String>, options: ValidatorOptions, descriptor: TypeDescriptor) -> Self {
        let coercer = build_coercer(&descriptor);
        Self {
            attributes,
            options,
            descriptor,
            coercer,
            coerce_with: None,
        }
    }

    pub fn with_coerce_with(mut self, coerce_with: Option<CoerceWith>) -> Self {
        self.coerce_with = coerce_with;
        self
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    fn coerce(&self, raw: &Value) -> Result<Value, InvalidValue> {
        match &self.coerce_with {
            Some(custom) => {
                let converted = custom.apply(raw)?;
                self.coercer.call(&converted)
            }
            None => self.coercer.call(raw),
        }
    }
}

impl Validator for CoerceValidator {
    fn name(&self) -> &str {
        "coerce"
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn phase(&self) -> Phase {
        Phase::Coerce
    }

    fn validate_param(&self, attr: &str, params: &mut Map<String, Value>) -> Result<(), Rejection> {
        let Some(slot) = params.get_mut(attr) else {
            return Ok(());
        };
        match self.coerce(slot) {
            Ok(coerced) => {
                if *slot != coerced {
                    *slot = coerced;
                }
                Ok(())
            }
            Err(invalid) => {
                let message = self
                    .options
                    .message
                    .clone()
                    .or(invalid.message)
                    .unwrap_or_else(|| messages::COERCE.to_string());
                Err(Rejection::new(message))
            }
        }
    }
}
