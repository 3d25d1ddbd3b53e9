use serde::Serialize;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::fmt;

/// Default messages, keyed by the validator that emits them.
pub mod messages {
    pub const PRESENCE: &str = "is missing";
    pub const COERCE: &str = "is invalid";
    pub const REGEXP: &str = "is invalid";
    pub const VALUES: &str = "does not have a valid value";
    pub const EXCEPT_VALUES: &str = "has a value not allowed";
    pub const BLANK: &str = "is empty";
    pub const MUTUAL_EXCLUSION: &str = "are mutually exclusive";
    pub const EXACTLY_ONE: &str = "are missing, exactly one parameter must be provided";
    pub const AT_LEAST_ONE: &str = "are missing, at least one parameter must be provided";
    pub const ALL_OR_NONE: &str = "provide all or none of parameters";
}

/// One step in a parameter path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Fully-qualified, index-aware parameter path, rendered as `a[b][0][c]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(SmallVec<[PathSegment; 4]>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// This path extended by a key.
    pub fn key(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(name.to_string()));
        next
    }

    /// This path extended by an array index.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub(crate) fn reverse(&mut self) {
        self.0.reverse();
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match (i, segment) {
                (0, PathSegment::Key(k)) => f.write_str(k)?,
                (0, PathSegment::Index(n)) => write!(f, "{n}")?,
                (_, PathSegment::Key(k)) => write!(f, "[{k}]")?,
                (_, PathSegment::Index(n)) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single failed rule: the implicated paths plus the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub params: Vec<FieldPath>,
    pub message: String,
    pub status: Option<u16>,
    pub headers: Vec<(String, String)>,
}

impl ValidationError {
    pub fn new(params: Vec<FieldPath>, message: impl Into<String>) -> Self {
        Self {
            params,
            message: message.into(),
            status: None,
            headers: Vec::new(),
        }
    }

    /// `"<paths joined with ', '> <message>"`
    pub fn full_message(&self) -> String {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if params.is_empty() {
            self.message.clone()
        } else {
            format!("{params} {}", self.message)
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_message())
    }
}

/// Every failure collected during one validation pass, in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Rendered messages with duplicate strings collapsed.
    pub fn full_messages(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::with_capacity(self.errors.len());
        for message in self.errors.iter().map(ValidationError::full_message) {
            if !seen.contains(&message) {
                seen.push(message);
            }
        }
        seen
    }

    /// First status override carried by any error.
    pub fn status(&self) -> Option<u16> {
        self.errors.iter().find_map(|e| e.status)
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        self.errors
            .iter()
            .flat_map(|e| e.headers.iter().cloned())
            .collect()
    }

    /// `[{"params": [...], "messages": [...]}]`, grouped by identical path lists.
    pub fn to_json(&self) -> Value {
        let mut grouped: Vec<(Vec<String>, Vec<String>)> = Vec::new();
        for error in &self.errors {
            let key: Vec<String> = error.params.iter().map(ToString::to_string).collect();
            let slot = match grouped.iter().position(|(params, _)| *params == key) {
                Some(i) => i,
                None => {
                    grouped.push((key, Vec::new()));
                    grouped.len() - 1
                }
            };
            let messages = &mut grouped[slot].1;
            if !messages.contains(&error.message) {
                messages.push(error.message.clone());
            }
        }
        Value::Array(
            grouped
                .into_iter()
                .map(|(params, messages)| json!({ "params": params, "messages": messages }))
                .collect(),
        )
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
