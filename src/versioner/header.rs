use super::{log_outcome, Strategy, VersionError, VersionOptions, Versioner, VersionerState};
use crate::accept::{parse_accept, parse_vendor, MediaRange, VendorMediaType};
use crate::format::ContentTypes;
use crate::request::RequestParts;

/// Reads the version from a vendor media type in `Accept`, such as
/// `application/vnd.acme-v1+json`.
///
/// Entries are tried highest quality first. A vendor type is accepted when
/// its vendor matches and its version (if any) is allowed; wildcards select
/// the newest allowed version; a plain registered content type is accepted
/// without a version.
#[derive(Debug)]
pub struct HeaderVersioner {
    options: VersionOptions,
    content_types: ContentTypes,
}

/// What the `Accept` header selected.
#[derive(Debug, Default)]
struct Selection {
    version: Option<String>,
    format: Option<String>,
}

impl HeaderVersioner {
    pub fn new(options: VersionOptions, content_types: ContentTypes) -> Self {
        Self { options, content_types }
    }

    fn newest(&self) -> Selection {
        Selection {
            version: self.options.versions.last().cloned(),
            format: None,
        }
    }

    fn select(&self, vendor: &str, request: &RequestParts) -> Result<Selection, VersionError> {
        let accept = request
            .header("accept")
            .map(str::trim)
            .filter(|a| !a.is_empty());
        let ranges = accept.map(parse_accept).unwrap_or_default();

        if self.options.strict {
            if accept.is_none() {
                return Err(VersionError::not_acceptable(
                    "Accept header must be set.",
                    self.options.cascade,
                ));
            }
            if !self.options.versions.is_empty() && !ranges.iter().any(|r| parse_vendor(&r.mime).is_some()) {
                return Err(self.missing_version());
            }
        }
        if accept.is_none() {
            return Ok(self.newest());
        }

        for range in &ranges {
            if let Some(media) = parse_vendor(&range.mime) {
                let allowed = media.version.as_deref().is_none_or(|v| self.options.allows(v));
                if media.vendor == vendor && allowed {
                    return Ok(Selection {
                        version: media.version,
                        format: media.format,
                    });
                }
                continue;
            }
            if range.mime == "*/*" || range.mime == "application/*" {
                return Ok(self.newest());
            }
            if let Some(format) = self.content_types.format_for_mime(&range.mime) {
                return Ok(Selection {
                    version: None,
                    format: Some(format.to_string()),
                });
            }
        }
        self.fail(vendor, &ranges)
    }

    /// Nothing acceptable: refuse when every entry names another vendor or
    /// an unknown version, otherwise continue without a version.
    fn fail(&self, vendor: &str, ranges: &[MediaRange]) -> Result<Selection, VersionError> {
        let parsed: Vec<Option<VendorMediaType>> = ranges.iter().map(|r| parse_vendor(&r.mime)).collect();
        if parsed.is_empty() {
            return Ok(Selection::default());
        }
        if parsed.iter().all(|m| m.as_ref().is_some_and(|m| m.vendor != vendor)) {
            return Err(VersionError::not_acceptable("API vendor not found.", self.options.cascade));
        }
        let unknown_version = |m: &Option<VendorMediaType>| {
            m.as_ref()
                .and_then(|m| m.version.as_deref())
                .is_some_and(|v| !self.options.allows(v))
        };
        if parsed.iter().all(unknown_version) {
            return Err(VersionError::not_found());
        }
        Ok(Selection::default())
    }
}

impl Versioner for HeaderVersioner {
    fn strategy(&self) -> Strategy {
        Strategy::Header
    }

    fn options(&self) -> &VersionOptions {
        &self.options
    }

    fn extract_version(&self, request: &RequestParts) -> Result<Option<String>, VersionError> {
        match self.options.vendor.as_deref() {
            Some(vendor) => self.select(vendor, request).map(|s| s.version),
            None => Ok(None),
        }
    }

    fn missing_version(&self) -> VersionError {
        VersionError::not_acceptable("API vendor or version not found.", self.options.cascade)
    }

    fn resolve(&self, request: &RequestParts) -> Result<VersionerState, VersionError> {
        let Some(vendor) = self.options.vendor.as_deref() else {
            return Ok(self.state(None));
        };
        let selection = self.select(vendor, request);
        let outcome = selection.as_ref().map(|_| ()).map_err(Clone::clone);
        let version = selection.as_ref().ok().and_then(|s| s.version.as_deref());
        log_outcome(Strategy::Header, version, &outcome);
        let selection = selection?;
        let mut state = self.state(selection.version);
        state.format = selection.format;
        Ok(state)
    }
}
