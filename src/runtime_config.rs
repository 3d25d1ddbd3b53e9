//! # Runtime Configuration Module
//!
//! Environment variable-based tuning for the router and validation engine.
//!
//! ## Environment Variables
//!
//! ### `PARAMGATE_GREEDY_THRESHOLD`
//!
//! Number of routes in one method group above which the router resolves
//! candidates with a single combined matcher instead of scanning routes one by
//! one. Results are identical either way. `0` always uses the combined matcher.
//!
//! Default: `32`
//!
//! ### `PARAMGATE_ROUTE_HEAD`
//!
//! When `true`, a `HEAD` request with no `HEAD` route falls back to `GET` routes.
//!
//! Default: `true`
//!
//! ### `PARAMGATE_COERCER_CACHE`
//!
//! `off` (or `false`/`0`) disables coercer memoization.
//!
//! Default: on
//!
//! ### `PARAMGATE_EMPTY_ARRAY_PLACEHOLDER`
//!
//! When `true`, an explicitly empty array group reports its required nested
//! fields as missing at index `0`.
//!
//! Default: `false`
//!
//! ## Usage
//!
//! ```rust
//! use paramgate::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Greedy threshold: {}", config.greedy_threshold);
//! ```

use std::env;

pub const DEFAULT_GREEDY_THRESHOLD: usize = 32;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Route count per method group that switches on combined matching (default: 32)
    pub greedy_threshold: usize,
    /// HEAD falls back to GET routes (default: true)
    pub route_head: bool,
    /// Memoize coercers by type signature (default: true)
    pub coercer_cache: bool,
    /// Report required fields under `[]` at index 0 (default: false)
    pub empty_array_placeholder: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            greedy_threshold: DEFAULT_GREEDY_THRESHOLD,
            route_head: true,
            coercer_cache: true,
            empty_array_placeholder: false,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        RuntimeConfig {
            greedy_threshold: env::var("PARAMGATE_GREEDY_THRESHOLD")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.greedy_threshold),
            route_head: env_flag("PARAMGATE_ROUTE_HEAD").unwrap_or(defaults.route_head),
            coercer_cache: env_flag("PARAMGATE_COERCER_CACHE").unwrap_or(defaults.coercer_cache),
            empty_array_placeholder: env_flag("PARAMGATE_EMPTY_ARRAY_PLACEHOLDER")
                .unwrap_or(defaults.empty_array_placeholder),
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name).ok().and_then(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("ON"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.greedy_threshold, 32);
        assert!(config.route_head);
        assert!(config.coercer_cache);
        assert!(!config.empty_array_placeholder);
    }
}
