//! Content-type registry and response format negotiation.

use crate::accept::{parse_accept, strip_vendor};
use crate::request::RequestParts;
use thiserror::Error;
use tracing::debug;

/// Query parameter that selects a format explicitly.
pub const FORMAT_PARAM: &str = "format";

/// Format used when nothing in the request or route selects one.
pub const DEFAULT_FORMAT: &str = "json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("The requested format '{0}' is not supported.")]
    NotSupported(String),
}

impl FormatError {
    pub fn status(&self) -> u16 {
        406
    }
}

/// Ordered `format → mime type` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypes {
    entries: Vec<(String, String)>,
}

impl Default for ContentTypes {
    fn default() -> Self {
        Self::from(vec![
            ("xml".to_string(), "application/xml".to_string()),
            ("serializable_hash".to_string(), "application/json".to_string()),
            ("json".to_string(), "application/json".to_string()),
            ("jsonapi".to_string(), "application/vnd.api+json".to_string()),
            ("binary".to_string(), "application/octet-stream".to_string()),
            ("txt".to_string(), "text/plain".to_string()),
        ])
    }
}

impl From<Vec<(String, String)>> for ContentTypes {
    fn from(entries: Vec<(String, String)>) -> Self {
        let mut types = Self { entries: Vec::new() };
        for (format, mime) in entries {
            types.insert(format, mime);
        }
        types
    }
}

impl ContentTypes {
    /// An empty table.
    pub fn none() -> Self {
        Self { entries: Vec::new() }
    }

    /// Adds or replaces `format`.
    pub fn insert(&mut self, format: impl Into<String>, mime: impl Into<String>) {
        let format = format.into();
        let mime = mime.into().to_ascii_lowercase();
        match self.entries.iter_mut().find(|(f, _)| *f == format) {
            Some(entry) => entry.1 = mime,
            None => self.entries.push((format, mime)),
        }
    }

    #[must_use]
    pub fn with(mut self, format: impl Into<String>, mime: impl Into<String>) -> Self {
        self.insert(format, mime);
        self
    }

    /// Keeps only `formats`, in the order given.
    #[must_use]
    pub fn only(&self, formats: &[&str]) -> Self {
        Self {
            entries: formats
                .iter()
                .filter_map(|f| self.entries.iter().find(|(name, _)| name.as_str() == *f).cloned())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn formats(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    pub fn mime_for(&self, format: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == format)
            .map(|(_, m)| m.as_str())
    }

    pub fn supports(&self, format: &str) -> bool {
        self.mime_for(format).is_some()
    }

    /// Format registered for `mime`, ignoring parameters such as `charset`.
    /// When several formats share a mime type the last one registered wins.
    pub fn format_for_mime(&self, mime: &str) -> Option<&str> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        self.entries
            .iter()
            .rev()
            .find(|(_, m)| m.eq_ignore_ascii_case(essence))
            .map(|(f, _)| f.as_str())
    }

    /// Selects the response format for `request`: path extension, then the
    /// `format` query parameter, then `route_format`, then the `Accept`
    /// header, then `default_format`.
    pub fn negotiate(
        &self,
        request: &RequestParts,
        route_format: Option<&str>,
        default_format: &str,
    ) -> Result<String, FormatError> {
        let format = self
            .format_from_extension(&request.path)
            .or_else(|| request.query.get(FORMAT_PARAM).and_then(|v| v.as_str()).map(str::to_string))
            .or_else(|| route_format.map(str::to_string))
            .or_else(|| request.header("accept").and_then(|accept| self.format_from_accept(accept)))
            .unwrap_or_else(|| default_format.to_string());

        if self.supports(&format) {
            debug!(format = %format, "Format negotiated");
            Ok(format)
        } else {
            Err(FormatError::NotSupported(format))
        }
    }

    fn format_from_extension(&self, path: &str) -> Option<String> {
        let last = path.rsplit('/').next()?;
        let (_, extension) = last.rsplit_once('.')?;
        self.supports(extension).then(|| extension.to_string())
    }

    fn format_from_accept(&self, accept: &str) -> Option<String> {
        parse_accept(accept)
            .into_iter()
            .flat_map(|range| {
                let stripped = strip_vendor(&range.mime);
                std::iter::once(range.mime).chain(stripped)
            })
            .find_map(|mime| self.format_for_mime(&mime).map(str::to_string))
    }
}
