//! Built-in validators and the [`Validator`] trait they implement.
//!
//! A validator is bound to one or more attribute names of a single scope. The
//! engine hands it the map for the current element (one object, or one array
//! member) and collects whatever it rejects.

mod allow_blank;
mod coerce;
mod default;
mod length;
mod predicate;
mod presence;
mod regexp;
mod relational;
mod same_as;
mod values;

pub use allow_blank::AllowBlankValidator;
pub use coerce::{CoerceValidator, CoerceWith};
pub use default::DefaultValidator;
pub use length::LengthValidator;
pub use predicate::PredicateValidator;
pub use presence::PresenceValidator;
pub use regexp::RegexpValidator;
pub use relational::{Relation, RelationalValidator};
pub use same_as::SameAsValidator;
pub use values::{ValueSet, ValuesValidator};

use serde_json::{Map, Value};
use std::fmt;

/// Execution order within one scope. Validators are stably sorted by phase,
/// so declaration order is kept inside each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Presence,
    Coerce,
    Default,
    Standard,
}

/// Options shared by every validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// The attribute was declared with `requires`.
    pub required: bool,
    /// `Some(true)` lets blank values skip value checks; `Some(false)` rejects them.
    pub allow_blank: Option<bool>,
    /// A failure stops every later validator for the same attribute.
    pub fail_fast: bool,
    /// Replaces the validator's default message.
    pub message: Option<String>,
}

impl ValidatorOptions {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: Option<String>) -> Self {
        if message.is_some() {
            self.message = message;
        }
        self
    }

    /// Rejection carrying the override message, or `default` when none was set.
    pub fn reject(&self, default: &str) -> Rejection {
        Rejection::new(self.message.as_deref().unwrap_or(default))
    }

    pub(crate) fn skips_blank(&self, value: &Value) -> bool {
        value.is_null() || (self.allow_blank == Some(true) && is_blank(value))
    }
}

/// Why a validator refused a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub message: String,
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            headers: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A relational failure names the implicated sibling attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationFailure {
    pub attributes: Vec<String>,
    pub rejection: Rejection,
}

/// A validation rule bound to attributes of one scope.
///
/// Implementations must not keep per-request state: one instance serves every
/// concurrent request for its endpoint.
pub trait Validator: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn attributes(&self) -> &[String];

    fn options(&self) -> &ValidatorOptions;

    fn phase(&self) -> Phase {
        Phase::Standard
    }

    /// Relational validators inspect the whole element once instead of each attribute.
    fn relational(&self) -> bool {
        false
    }

    /// Checks (and may rewrite) `params[attr]`.
    fn validate_param(&self, _attr: &str, _params: &mut Map<String, Value>) -> Result<(), Rejection> {
        Ok(())
    }

    fn validate_relation(&self, _params: &Map<String, Value>) -> Result<(), RelationFailure> {
        Ok(())
    }
}

/// Blank values: `null`, `false`, whitespace-only strings, empty arrays and objects.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(_) => false,
    }
}

/// Loose equality used by value lists: numbers compare numerically.
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// `value` itself, or each member when it is an array.
pub(crate) fn members(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        other => Box::new(std::iter::once(other)),
    }
}
