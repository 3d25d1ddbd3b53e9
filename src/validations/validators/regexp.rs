use super::{members, Rejection, Validator, ValidatorOptions};
use crate::error::SchemaError;
use crate::validations::errors::messages;
use regex::Regex;
use serde_json::{Map, Value};

/// Every string (or stringified scalar) value must match the pattern.
#[derive(Debug, Clone)]
pub struct RegexpValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
    pattern: Regex,
}

impl RegexpValidator {
    pub fn new(
        attributes: Vec<String>,
        options: ValidatorOptions,
        pattern: &str,
    ) -> Result<Self, SchemaError> {
        let pattern = Regex::new(pattern).map_err(|e| SchemaError::invalid_options("regexp", e.to_string()))?;
        Ok(Self {
            attributes,
            options,
            pattern,
        })
    }
}

impl Validator for RegexpValidator {
    fn name(&self) -> &str {
        "regexp"
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn validate_param(&self, attr: &str, params: &mut Map<String, Value>) -> Result<(), Rejection> {
        let Some(value) = params.get(attr) else {
            return Ok(());
        };
        if self.options.skips_blank(value) {
            return Ok(());
        }
        let matches = members(value).all(|v| match v {
            Value::String(s) => self.pattern.is_match(s),
            Value::Number(n) => self.pattern.is_match(&n.to_string()),
            Value::Bool(b) => self.pattern.is_match(&b.to_string()),
            _ => false,
        });
        if matches {
            Ok(())
        } else {
            Err(self.options.reject(messages::REGEXP))
        }
    }
}
