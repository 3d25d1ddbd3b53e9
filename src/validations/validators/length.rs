use super::{Rejection, Validator, ValidatorOptions};
use crate::error::SchemaError;
use serde_json::{Map, Value};

/// Length bounds for strings (in characters) and arrays.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
    min: Option<usize>,
    max: Option<usize>,
    is: Option<usize>,
}

impl LengthValidator {
    pub fn new(
        attributes: Vec<String>,
        options: ValidatorOptions,
        min: Option<usize>,
        max: Option<usize>,
        is: Option<usize>,
    ) -> Result<Self, SchemaError> {
        if is.is_some() && (min.is_some() || max.is_some()) {
            return Err(SchemaError::invalid_options(
                "length",
                "'is' cannot be combined with 'min' or 'max'",
            ));
        }
        if is.is_none() && min.is_none() && max.is_none() {
            return Err(SchemaError::invalid_options("length", "one of 'min', 'max' or 'is' is required"));
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(SchemaError::invalid_options("length", "'min' cannot be greater than 'max'"));
            }
        }
        Ok(Self {
            attributes,
            options,
            min,
            max,
            is,
        })
    }

    fn default_message(&self) -> String {
        match (self.min, self.max, self.is) {
            (_, _, Some(n)) => format!("is expected to have length exactly equal to {n}"),
            (Some(lo), Some(hi), _) => format!("is expected to have length within {lo} and {hi}"),
            (Some(lo), None, _) => format!("is expected to have length greater than or equal to {lo}"),
            (None, Some(hi), _) => format!("is expected to have length less than or equal to {hi}"),
            (None, None, None) => String::new(),
        }
    }
}

impl Validator for LengthValidator {
    fn name(&self) -> &str {
        "length"
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn validate_param(&self, attr: &str, params: &mut Map<String, Value>) -> Result<(), Rejection> {
        let len = match params.get(attr) {
            Some(Value::String(s)) => s.chars().count(),
            Some(Value::Array(items)) => items.len(),
            _ => return Ok(()),
        };
        let ok = self.is.map_or(true, |n| len == n)
            && self.min.map_or(true, |lo| len >= lo)
            && self.max.map_or(true, |hi| len <= hi);
        if ok {
            Ok(())
        } else {
            Err(self.options.reject(&self.default_message()))
        }
    }
}
