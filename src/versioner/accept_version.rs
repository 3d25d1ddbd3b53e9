use super::{Strategy, VersionError, VersionOptions, Versioner};
use crate::request::RequestParts;

pub const ACCEPT_VERSION_HEADER: &str = "accept-version";

/// Reads the version from the `Accept-Version` header.
#[derive(Debug)]
pub struct AcceptVersionHeaderVersioner {
    options: VersionOptions,
}

impl AcceptVersionHeaderVersioner {
    pub fn new(options: VersionOptions) -> Self {
        Self { options }
    }
}

impl Versioner for AcceptVersionHeaderVersioner {
    fn strategy(&self) -> Strategy {
        Strategy::AcceptVersionHeader
    }

    fn options(&self) -> &VersionOptions {
        &self.options
    }

    fn extract_version(&self, request: &RequestParts) -> Result<Option<String>, VersionError> {
        Ok(request
            .header(ACCEPT_VERSION_HEADER)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    fn missing_version(&self) -> VersionError {
        VersionError::not_acceptable("Accept-Version header must be set.", self.options.cascade)
    }
}
