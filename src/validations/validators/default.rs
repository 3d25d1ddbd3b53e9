use super::{Phase, Validator, ValidatorOptions};
use serde_json::{Map, Value};

/// Fills an absent or `null` attribute with a fixed value.
///
/// Runs for optional attributes whose key is missing, unlike other validators.
#[derive(Debug, Clone)]
pub struct DefaultValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
    default: Value,
}

impl DefaultValidator {
    pub fn new(attributes: Vec<String>, options: ValidatorOptions, default: Value) -> Self {
        Self {
            attributes,
            options,
            default,
        }
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }
}

impl Validator for DefaultValidator {
    fn name(&self) -> &str {
        "default"
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn phase(&self) -> Phase {
        Phase::Default
    }

    fn validate_param(
        &self,
        attr: &str,
        params: &mut Map<String, Value>,
    ) -> Result<(), super::Rejection> {
        let slot = params.entry(attr.to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = self.default.clone();
        }
        Ok(())
    }
}
