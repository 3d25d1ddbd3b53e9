use super::{members, values_equal, Rejection, Validator, ValidatorOptions};
use crate::validations::errors::messages;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

type ValuePredicate = dyn Fn(&Value) -> bool + Send + Sync;

/// Allowed (or excluded) values for `values` / `except_values`.
#[derive(Clone)]
pub enum ValueSet {
    List(Vec<Value>),
    /// Inclusive numeric range; an open bound is `None`.
    Range { min: Option<f64>, max: Option<f64> },
    Predicate(Arc<ValuePredicate>),
}

impl ValueSet {
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        ValueSet::List(values.into_iter().map(Into::into).collect())
    }

    pub fn range(min: f64, max: f64) -> Self {
        ValueSet::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        ValueSet::Predicate(Arc::new(f))
    }

    /// Whether one scalar value belongs to the set.
    pub fn contains(&self, value: &Value) -> bool {
        match self {
            ValueSet::List(list) => list.iter().any(|v| values_equal(v, value)),
            ValueSet::Range { min, max } => value.as_f64().is_some_and(|n| {
                min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
            }),
            ValueSet::Predicate(f) => f(value),
        }
    }
}

impl fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSet::List(list) => f.debug_tuple("List").field(list).finish(),
            ValueSet::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            ValueSet::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSet::List(list) => write!(f, "{}", Value::Array(list.clone())),
            ValueSet::Range { min, max } => {
                let bound = |b: &Option<f64>| b.map(|n| n.to_string()).unwrap_or_default();
                write!(f, "{}..{}", bound(min), bound(max))
            }
            ValueSet::Predicate(_) => f.write_str("#<Proc>"),
        }
    }
}

/// Inclusion (`values`) or exclusion (`except_values`) check, element-wise on arrays.
#[derive(Debug, Clone)]
pub struct ValuesValidator {
    attributes: Vec<String>,
    options: ValidatorOptions,
    set: ValueSet,
    except: bool,
}

impl ValuesValidator {
    pub fn values(attributes: Vec<String>, options: ValidatorOptions, set: ValueSet) -> Self {
        Self {
            attributes,
            options,
            set,
            except: false,
        }
    }

    pub fn except_values(attributes: Vec<String>, options: ValidatorOptions, set: ValueSet) -> Self {
        Self {
            attributes,
            options,
            set,
            except: true,
        }
    }
}

impl Validator for ValuesValidator {
    fn name(&self) -> &str {
        if self.except {
            "except_values"
        } else {
            "values"
        }
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
        if self.except {
            if members(value).any(|v| self.set.contains(v)) {
                return Err(self.options.reject(messages::EXCEPT_VALUES));
            }
        } else if !members(value).all(|v| self.set.contains(v)) {
            return Err(self.options.reject(messages::VALUES));
        }
        Ok(())
    }
}
