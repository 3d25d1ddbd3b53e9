//! `Accept`-style header grammar shared by format negotiation and the
//! vendor-header versioner.

use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

/// `vnd.<vendor>[-<version>][+<format>]` subtype of a vendor media type.
static VENDOR_SUBTYPE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^vnd\.(?P<vendor>[a-z0-9.\-_!^]+?)(?:-(?P<version>[a-z0-9*.]+))?(?:\+(?P<format>[a-z0-9*\-.]+))?$").ok()
});

static VENDOR_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"vnd\.[^+]+\+").ok());

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    /// Lowercased `type/subtype`, parameters removed.
    pub mime: String,
    pub quality: f32,
}

/// Parses `header` into media ranges, highest quality first. Entries with
/// equal quality keep their header order; a missing `q` counts as `1.0`.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let mime = parts.next()?.trim().to_ascii_lowercase();
            if !mime.contains('/') {
                return None;
            }
            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                .next()
                .unwrap_or(1.0);
            Some(MediaRange { mime, quality })
        })
        .collect();
    ranges.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
    ranges
}

/// Pieces of `application/vnd.acme-v1+json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorMediaType {
    pub vendor: String,
    pub version: Option<String>,
    pub format: Option<String>,
}

/// Parses a vendor media type; `None` for anything else.
pub fn parse_vendor(mime: &str) -> Option<VendorMediaType> {
    let (_, subtype) = mime.split_once('/')?;
    let captures = VENDOR_SUBTYPE.as_ref()?.captures(subtype)?;
    Some(VendorMediaType {
        vendor: captures.name("vendor")?.as_str().to_string(),
        version: captures.name("version").map(|m| m.as_str().to_string()),
        format: captures.name("format").map(|m| m.as_str().to_string()),
    })
}

/// `application/vnd.acme-v1+json` → `application/json`.
pub fn strip_vendor(mime: &str) -> Option<String> {
    let prefix = VENDOR_PREFIX.as_ref()?;
    prefix.is_match(mime).then(|| prefix.replace(mime, "").into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorts_by_quality_keeping_ties_in_order() {
        let ranges = parse_accept("text/plain;q=0.5, application/json, application/xml;q=0.9, text/html");
        let mimes: Vec<&str> = ranges.iter().map(|r| r.mime.as_str()).collect();
        assert_eq!(mimes, ["application/json", "text/html", "application/xml", "text/plain"]);
    }

    #[test]
    fn test_skips_entries_without_subtype() {
        let ranges = parse_accept("json, application/json; charset=utf-8");
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].mime, "application/json");
        assert!((ranges[0].quality - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parses_vendor_types() {
        let media = parse_vendor("application/vnd.my-app-v2+json").unwrap();
        assert_eq!(media.vendor, "my-app");
        assert_eq!(media.version.as_deref(), Some("v2"));
        assert_eq!(media.format.as_deref(), Some("json"));

        let bare = parse_vendor("application/vnd.acme").unwrap();
        assert_eq!(bare.vendor, "acme");
        assert_eq!(bare.version, None);

        assert!(parse_vendor("application/json").is_none());
    }

    #[test]
    fn test_strips_vendor_prefix() {
        assert_eq!(strip_vendor("application/vnd.acme-v1+json").as_deref(), Some("application/json"));
        assert_eq!(strip_vendor("application/json"), None);
    }
}
