//! # Coercer Cache
//!
//! Memoizes compiled [`Coercer`]s by type signature so every parameter declared
//! as `Array[String]` shares one strategy.
//!
//! ## Thread Safety
//!
//! The cache is a [`DashMap`], so lookups never serialize requests. Coercers are
//! built outside the map lock and inserted with `entry().or_insert()`: two threads
//! racing on the same signature may both build, but only the first insert is kept
//! and both receive that coercer. Building is idempotent, so the race is harmless.
//!
//! ## Configuration
//!
//! The shared cache can be disabled via `PARAMGATE_COERCER_CACHE=off`, in which
//! case every call builds a fresh coercer.

use super::coercer::Coercer;
use super::types::TypeDescriptor;
use crate::runtime_config::RuntimeConfig;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::debug;

static GLOBAL: Lazy<CoercerCache> =
    Lazy::new(|| CoercerCache::new(RuntimeConfig::from_env().coercer_cache));

/// Concurrent cache of coercers keyed by [`TypeDescriptor::signature`].
#[derive(Debug)]
pub struct CoercerCache {
    entries: DashMap<String, Arc<Coercer>>,
    enabled: bool,
}

impl CoercerCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: DashMap::new(),
            enabled,
        }
    }

    /// Process-wide cache used by parameter declarations.
    pub fn global() -> &'static CoercerCache {
        &GLOBAL
    }

    /// Returns the cached coercer for `descriptor`, building it on first use.
    pub fn get_or_build(&self, descriptor: &TypeDescriptor) -> Arc<Coercer> {
        if !self.enabled {
            return Arc::new(Coercer::build(descriptor, &|m| self.get_or_build(m)));
        }

        let key = descriptor.signature();
        if let Some(hit) = self.entries.get(&key) {
            return Arc::clone(hit.value());
        }

        let built = Arc::new(Coercer::build(descriptor, &|m| self.get_or_build(m)));
        let entry = self.entries.entry(key).or_insert(built);
        debug!(
            signature = %entry.key(),
            cache_size = self.entries.len(),
            "Coercer compiled and cached"
        );
        Arc::clone(entry.value())
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Coercer for `descriptor` from the process-wide cache.
pub fn build_coercer(descriptor: &TypeDescriptor) -> Arc<Coercer> {
    CoercerCache::global().get_or_build(descriptor)
}
