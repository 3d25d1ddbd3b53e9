use super::{Phase, Rejection, Validator, ValidatorOptions};
use crate::validations::errors::messages;
use serde_json::{Map, Value};

/// Rejects an element that lacks the attribute key. A present `null` counts as provided.
#[derive(Debug, Clone)]
pub struct PresenceValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
}

impl PresenceValidator {
    pub fn new(attributes: Vec<String>, options: ValidatorOptions) -> Self {
        Self {
            attributes,
            options: ValidatorOptions {
                required: true,
                ..options
            },
        }
    }
}

impl Validator for PresenceValidator {
    fn name(&self) -> &str {
        "presence"
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn phase(&self) -> Phase {
        Phase::Presence
    }

    fn validate_param(&self, attr: &str, params: &mut Map<String, Value>) -> Result<(), Rejection> {
        if params.contains_key(attr) {
            Ok(())
        } else {
            Err(self.options.reject(messages::PRESENCE))
        }
    }
}
