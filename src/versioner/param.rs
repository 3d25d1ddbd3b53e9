use super::{Strategy, VersionError, VersionOptions, Versioner};
use crate::request::RequestParts;
use serde_json::{Map, Value};

/// Reads the version from a query parameter (`apiver` unless configured)
/// and keeps it out of the parameters handed to validation.
#[derive(Debug)]
pub struct ParamVersioner {
    options: VersionOptions,
}

impl ParamVersioner {
    pub fn new(options: VersionOptions) -> Self {
        Self { options }
    }
}

impl Versioner for ParamVersioner {
    fn strategy(&self) -> Strategy {
        Strategy::Param
    }

    fn options(&self) -> &VersionOptions {
        &self.options
    }

    fn extract_version(&self, request: &RequestParts) -> Result<Option<String>, VersionError> {
        Ok(request
            .query
            .get(&self.options.parameter)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn strip(&self, query: &mut Map<String, Value>) {
        query.remove(&self.options.parameter);
    }
}
