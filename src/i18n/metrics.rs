//! Message resolution metrics.
//!
//! Counters for locale resolution, namespace loading, bundle caching and
//! key lookups. Exposed by the service on `/metrics`.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Process-wide i18n counters.
#[derive(Debug, Default)]
pub struct I18nMetrics {
    locales_resolved: AtomicUsize,
    locales_rejected: AtomicUsize,
    namespace_loads: AtomicUsize,
    namespace_failures: AtomicUsize,
    cache_hits: AtomicUsize,
    cache_misses: AtomicUsize,
    lookup_hits: AtomicUsize,
    lookup_misses: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<I18nMetrics> = OnceLock::new();

impl I18nMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the global metrics instance.
    pub fn global() -> &'static I18nMetrics {
        METRICS.get_or_init(I18nMetrics::new)
    }

    pub fn record_locale_resolved(&self) {
        self.locales_resolved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_locale_rejected(&self) {
        self.locales_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one namespace load attempt.
    pub fn record_namespace_load(&self) {
        self.namespace_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a namespace that was omitted because its bundle failed to load.
    pub fn record_namespace_failure(&self) {
        self.namespace_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup_hit(&self) {
        self.lookup_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lookup that fell back to the raw key.
    pub fn record_lookup_miss(&self) {
        self.lookup_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn locales_rejected(&self) -> usize {
        self.locales_rejected.load(Ordering::Relaxed)
    }

    pub fn namespace_loads(&self) -> usize {
        self.namespace_loads.load(Ordering::Relaxed)
    }

    pub fn namespace_failures(&self) -> usize {
        self.namespace_failures.load(Ordering::Relaxed)
    }

    pub fn lookup_misses(&self) -> usize {
        self.lookup_misses.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);
        let lookup_hits = self.lookup_hits.load(Ordering::Relaxed);
        let lookup_misses = self.lookup_misses.load(Ordering::Relaxed);

        MetricsReport {
            locales_resolved: self.locales_resolved.load(Ordering::Relaxed),
            locales_rejected: self.locales_rejected(),
            namespace_loads: self.namespace_loads(),
            namespace_failures: self.namespace_failures(),
            cache_hits,
            cache_misses,
            cache_hit_rate: percentage(cache_hits, cache_hits + cache_misses),
            lookup_hits,
            lookup_misses,
            lookup_hit_rate: percentage(lookup_hits, lookup_hits + lookup_misses),
        }
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Snapshot of the i18n counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub locales_resolved: usize,
    pub locales_rejected: usize,
    pub namespace_loads: usize,
    pub namespace_failures: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub lookup_hits: usize,
    pub lookup_misses: usize,

    /// Share of lookups that found a translation, as a percentage (0-100)
    pub lookup_hit_rate: f64,
}
