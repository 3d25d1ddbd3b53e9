//! # API Versioning
//!
//! A [`Versioner`] reads the requested API version from a request and checks
//! it against the route's allowed versions before the route is accepted.
//!
//! | Strategy                 | Reads                                 |
//! |--------------------------|---------------------------------------|
//! | [`Strategy::Path`]       | first path segment (`/v1/...`)        |
//! | [`Strategy::Header`]     | vendor media type in `Accept`         |
//! | [`Strategy::Param`]      | query parameter (`apiver` by default) |
//! | [`Strategy::AcceptVersionHeader`] | `Accept-Version` header      |
//!
//! A version outside the allow-list fails with `404 API Version Not Found`
//! and `X-Cascade: pass`, telling the router to try the next candidate
//! route. Routes declared for other versions of the same path are usually
//! that next candidate.

mod accept_version;
mod header;
mod param;
mod path;

pub use accept_version::AcceptVersionHeaderVersioner;
pub use header::HeaderVersioner;
pub use param::ParamVersioner;
pub use path::PathVersioner;

use crate::error::SchemaError;
use crate::format::ContentTypes;
use crate::request::RequestParts;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const CASCADE_HEADER: &str = "X-Cascade";
pub const DEFAULT_VERSION_PARAM: &str = "apiver";

/// Where the version is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Path,
    Header,
    Param,
    AcceptVersionHeader,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Path => "path",
            Strategy::Header => "header",
            Strategy::Param => "param",
            Strategy::AcceptVersionHeader => "accept_version_header",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Strategy::Path),
            "header" => Ok(Strategy::Header),
            "param" => Ok(Strategy::Param),
            "accept_version_header" => Ok(Strategy::AcceptVersionHeader),
            other => Err(SchemaError::UnknownStrategy(other.to_string())),
        }
    }
}

/// Versioning settings of a group of routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionOptions {
    pub using: Strategy,
    /// Allow-list. Empty accepts any version.
    pub versions: Vec<String>,
    /// Require a version to be present.
    pub strict: bool,
    /// Mark rejections so the router may try other routes.
    pub cascade: bool,
    /// Query parameter for [`Strategy::Param`].
    pub parameter: String,
    /// Vendor token for [`Strategy::Header`].
    pub vendor: Option<String>,
    /// Path prefix stripped before reading a path version.
    pub prefix: Option<String>,
    pub mount_path: Option<String>,
    /// Regex a path segment must match to count as a version.
    pub pattern: Option<String>,
}

impl Default for VersionOptions {
    fn default() -> Self {
        Self {
            using: Strategy::Path,
            versions: Vec::new(),
            strict: false,
            cascade: true,
            parameter: DEFAULT_VERSION_PARAM.to_string(),
            vendor: None,
            prefix: None,
            mount_path: None,
            pattern: None,
        }
    }
}

impl VersionOptions {
    pub fn using(strategy: Strategy) -> Self {
        Self {
            using: strategy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.versions = versions.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    #[must_use]
    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = parameter.into();
        self
    }

    #[must_use]
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn mount_path(mut self, mount_path: impl Into<String>) -> Self {
        self.mount_path = Some(mount_path.into());
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// `true` when no allow-list is configured or `version` is on it.
    pub fn allows(&self, version: &str) -> bool {
        self.versions.is_empty() || self.versions.iter().any(|v| v == version)
    }
}

/// Why a request's version was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct VersionError {
    pub status: u16,
    pub message: String,
    /// Other routes may still accept the request.
    pub cascade: bool,
}

impl VersionError {
    /// Version missing from the allow-list.
    pub fn not_found() -> Self {
        Self {
            status: 404,
            message: "404 API Version Not Found".to_string(),
            cascade: true,
        }
    }

    pub fn not_acceptable(message: impl Into<String>, cascade: bool) -> Self {
        Self {
            status: 406,
            message: message.into(),
            cascade,
        }
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        if self.cascade {
            vec![(CASCADE_HEADER.to_string(), "pass".to_string())]
        } else {
            Vec::new()
        }
    }
}

/// Version information resolved for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionerState {
    pub version: Option<String>,
    pub cascade: bool,
    pub allowed: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Format named by a vendor media type (`+json`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// A version extraction strategy.
pub trait Versioner: Send + Sync + fmt::Debug {
    fn strategy(&self) -> Strategy;

    fn options(&self) -> &VersionOptions;

    /// Version carried by `request`, if any.
    fn extract_version(&self, request: &RequestParts) -> Result<Option<String>, VersionError>;

    /// Error for a strict versioner that found no version.
    fn missing_version(&self) -> VersionError {
        VersionError::not_found()
    }

    fn reject_if_unmatched(&self, version: Option<&str>) -> Result<(), VersionError> {
        let options = self.options();
        match version {
            None if options.strict => Err(self.missing_version()),
            Some(version) if !options.allows(version) => Err(VersionError::not_found()),
            _ => Ok(()),
        }
    }

    /// Removes version carriers from the query before parameters are merged.
    fn strip(&self, _query: &mut Map<String, Value>) {}

    fn resolve(&self, request: &RequestParts) -> Result<VersionerState, VersionError> {
        let version = self.extract_version(request)?;
        let outcome = self.reject_if_unmatched(version.as_deref());
        log_outcome(self.strategy(), version.as_deref(), &outcome);
        outcome?;
        Ok(self.state(version))
    }

    fn state(&self, version: Option<String>) -> VersionerState {
        let options = self.options();
        VersionerState {
            version,
            cascade: options.cascade,
            allowed: options.versions.clone(),
            vendor: options.vendor.clone(),
            format: None,
        }
    }
}

pub(crate) fn log_outcome(strategy: Strategy, version: Option<&str>, outcome: &Result<(), VersionError>) {
    match outcome {
        Ok(()) => debug!(strategy = %strategy, version = ?version, "API version resolved"),
        Err(err) => warn!(
            strategy = %strategy,
            version = ?version,
            status = err.status,
            cascade = err.cascade,
            "API version rejected"
        ),
    }
}

/// Builds the versioner selected by `options.using`. `content_types` feeds
/// the media types the header strategy recognises.
pub fn build(options: VersionOptions, content_types: &ContentTypes) -> Result<Arc<dyn Versioner>, SchemaError> {
    Ok(match options.using {
        Strategy::Path => Arc::new(PathVersioner::new(options)?),
        Strategy::Header => Arc::new(HeaderVersioner::new(options, content_types.clone())),
        Strategy::Param => Arc::new(ParamVersioner::new(options)),
        Strategy::AcceptVersionHeader => Arc::new(AcceptVersionHeaderVersioner::new(options)),
    })
}
