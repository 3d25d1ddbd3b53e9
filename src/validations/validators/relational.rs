use super::{RelationFailure, Validator, ValidatorOptions};
use crate::error::SchemaError;
use crate::validations::errors::messages;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Constraint families spanning sibling attributes of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    MutuallyExclusive,
    ExactlyOneOf,
    AtLeastOneOf,
    AllOrNoneOf,
}

impl Relation {
    pub fn name(self) -> &'static str {
        match self {
            Relation::MutuallyExclusive => "mutually_exclusive",
            Relation::ExactlyOneOf => "exactly_one_of",
            Relation::AtLeastOneOf => "at_least_one_of",
            Relation::AllOrNoneOf => "all_or_none_of",
        }
    }
}

/// Relational validator. Presence means the key exists in the current element;
/// values supplied at any other nesting level never count.
#[derive(Debug, Clone)]
pub struct RelationalValidator {
    relation: Relation,
    attributes: Vec<String>,
    options: ValidatorOptions,
}

impl RelationalValidator {
    pub fn new(
        relation: Relation,
        attributes: Vec<String>,
        options: ValidatorOptions,
    ) -> Result<Self, SchemaError> {
        if attributes.len() < 2 {
            return Err(SchemaError::TooFewAttributes {
                validator: relation.name().to_string(),
            });
        }
        Ok(Self {
            relation,
            attributes,
            options,
        })
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    fn fail(&self, attributes: Vec<String>, default: &str) -> Result<(), RelationFailure> {
        Err(RelationFailure {
            attributes,
            rejection: self.options.reject(default),
        })
    }
}

impl Validator for RelationalValidator {
    fn name(&self) -> &str {
        self.relation.name()
    }

    fn attributes(&self) -> &[String] {
        &self.attributes
    }

    fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    fn relational(&self) -> bool {
        true
    }

    fn validate_relation(&self, params: &Map<String, Value>) -> Result<(), RelationFailure> {
        let present: Vec<String> = self
            .attributes
            .iter()
            .filter(|a| params.contains_key(a.as_str()))
            .cloned()
            .collect();

        match self.relation {
            Relation::MutuallyExclusive if present.len() > 1 => {
                self.fail(present, messages::MUTUAL_EXCLUSION)
            }
            Relation::ExactlyOneOf if present.is_empty() => {
                self.fail(self.attributes.clone(), messages::EXACTLY_ONE)
            }
            Relation::ExactlyOneOf if present.len() > 1 => {
                self.fail(present, messages::MUTUAL_EXCLUSION)
            }
            Relation::AtLeastOneOf if present.is_empty() => {
                self.fail(self.attributes.clone(), messages::AT_LEAST_ONE)
            }
            Relation::AllOrNoneOf if !present.is_empty() && present.len() < self.attributes.len() => {
                self.fail(self.attributes.clone(), messages::ALL_OR_NONE)
            }
            _ => Ok(()),
        }
    }
}
