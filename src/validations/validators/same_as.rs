use super::{Rejection, Validator, ValidatorOptions};
use serde_json::{Map, Value};

/// Requires the attribute to equal a sibling attribute, e.g. a password confirmation.
#[derive(Debug, Clone)]
pub struct SameAsValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
    other: String,
}

impl SameAsValidator {
    pub fn new(attributes: Vec<String>, options: ValidatorOptions, other: impl Into<String>) -> Self {
        Self {
            attributes,
            options,
            other: other.into(),
        }
    }
}

impl Validator for SameAsValidator {
    fn name(&self) -> &str {
        "same_as"
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn validate_param(&self, attr: &str, params: &mut Map<String, Value>) -> Result<(), Rejection> {
        if params.get(attr) == params.get(&self.other) {
            return Ok(());
        }
        let default = format!("is not the same as {}", self.other);
        Err(self.options.reject(&default))
    }
}
