//! # Error Types
//!
//! Authoring-time configuration errors. Everything in this module is raised while
//! an API definition is being built and is expected to abort startup. Request-time
//! failures (validation, routing, versioning) are returned as data by their own
//! modules and never surface as a [`SchemaError`].

use thiserror::Error;

/// Invalid parameter, route or validator declaration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required group (`requires :items do ... end`) was opened without a type.
    #[error("group type is required")]
    MissingGroupType,

    /// A group was opened with a type that cannot hold nested parameters.
    #[error("group type must be Array, Hash, JSON or Array[JSON]")]
    UnsupportedGroupType,

    /// Both `type` and `types` were supplied on one parameter.
    #[error(":type may not be supplied with :types")]
    TypeWithTypes,

    /// `coerce_with` was supplied without a type.
    #[error("must supply type for coerce_with")]
    CoerceWithoutType,

    /// `coerce_with` was supplied for a JSON type, which already defines its own parsing.
    #[error("coerce_with disallowed for type: {0}")]
    CoerceWithDisallowed(String),

    /// Two options on one parameter contradict each other.
    #[error("{option1}: {value1} is incompatible with {option2}: {value2}")]
    IncompatibleOptionValues {
        option1: String,
        value1: String,
        option2: String,
        value2: String,
    },

    /// A type name could not be resolved.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// No validator is registered under the given name.
    #[error("unknown validator: {0}")]
    UnknownValidator(String),

    /// A validator rejected its options.
    #[error("invalid options for validator {validator}: {reason}")]
    InvalidValidatorOptions { validator: String, reason: String },

    /// A relational validator was declared with fewer than two attributes.
    #[error("{validator} requires at least two parameters")]
    TooFewAttributes { validator: String },

    /// A route template or requirement could not be compiled.
    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A versioning strategy name was not recognised.
    #[error("unknown versioning strategy: {0}")]
    UnknownStrategy(String),

    /// An HTTP method token was not recognised.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),
}

impl SchemaError {
    pub(crate) fn incompatible(
        option1: &str,
        value1: impl std::fmt::Display,
        option2: &str,
        value2: impl std::fmt::Display,
    ) -> Self {
        SchemaError::IncompatibleOptionValues {
            option1: option1.to_string(),
            value1: value1.to_string(),
            option2: option2.to_string(),
            value2: value2.to_string(),
        }
    }

    pub(crate) fn invalid_options(validator: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidValidatorOptions {
            validator: validator.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_pattern(pattern: &str, reason: impl std::fmt::Display) -> Self {
        SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }
}
