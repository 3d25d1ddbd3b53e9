use super::{Strategy, VersionError, VersionOptions, Versioner};
use crate::error::SchemaError;
use crate::request::RequestParts;
use crate::router::normalize_path;
use regex::Regex;

/// Reads the version from the first path segment after any mount path and
/// prefix: `/api/v1/users` with prefix `/api` yields `v1`.
#[derive(Debug)]
pub struct PathVersioner {
    options: VersionOptions,
    pattern: Option<Regex>,
}

impl PathVersioner {
    pub fn new(options: VersionOptions) -> Result<Self, SchemaError> {
        let pattern = options
            .pattern
            .as_deref()
            .map(|p| Regex::new(&format!("^(?i:{p})$")).map_err(|e| SchemaError::invalid_pattern(p, e)))
            .transpose()?;
        Ok(Self { options, pattern })
    }
}

impl Versioner for PathVersioner {
    fn strategy(&self) -> Strategy {
        Strategy::Path
    }

    fn options(&self) -> &VersionOptions {
        &self.options
    }

    fn extract_version(&self, request: &RequestParts) -> Result<Option<String>, VersionError> {
        let mut path = normalize_path(&request.path);
        if path == "/" {
            return Ok(None);
        }
        let prefixes = [self.options.mount_path.as_deref(), self.options.prefix.as_deref()];
        for prefix in prefixes.into_iter().flatten() {
            let prefix = normalize_path(prefix);
            if prefix != "/" && path.starts_with(&prefix) {
                path = path[prefix.len()..].to_string();
            }
        }
        let Some(candidate) = path.trim_start_matches('/').split('/').next().filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if self.pattern.as_ref().is_some_and(|re| !re.is_match(candidate)) {
            return Ok(None);
        }
        Ok(Some(candidate.to_string()))
    }
}
