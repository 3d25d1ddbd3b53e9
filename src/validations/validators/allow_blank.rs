use super::{is_blank, Rejection, Validator, ValidatorOptions};
use crate::validations::errors::messages;
use serde_json::{Map, Value};

/// `allow_blank: false`: rejects blank values. `false` itself is not blank here.
#[derive(Debug, Clone)]
pub struct AllowBlankValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
}

impl AllowBlankValidator {
    pub fn new(attributes: Vec<String>, options: ValidatorOptions) -> Self {
        Self {
            attributes,
            options,
        }
    }
}

impl Validator for AllowBlankValidator {
    fn name(&self) -> &str {
        "allow_blank"
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn validate_param(&self, attr: &str, params: &mut Map<String, Value>) -> Result<(), Rejection> {
        match params.get(attr) {
            Some(Value::Bool(false)) => Ok(()),
            Some(value) if !is_blank(value) => Ok(()),
            _ => Err(self.options.reject(messages::BLANK)),
        }
    }
}
