//! Translation metrics and observability module.
//!
//! Counts how bundles are resolved (cache, fallback dictionary, remote
//! provider) so a degraded provider shows up in the metrics report instead of
//! silently serving source-language text.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters shared by the resolver and the translator.
#[derive(Debug)]
pub struct TranslationMetrics {
    started_at: DateTime<Utc>,

    /// Bundles served from the cache
    cache_hits: AtomicUsize,

    /// Bundles computed because the cache had no entry
    cache_misses: AtomicUsize,

    /// Requests that waited on another request's in-flight computation
    coalesced_waits: AtomicUsize,

    /// Bundles served from the fallback dictionary
    fallback_hits: AtomicUsize,

    /// Calls made to the remote translation provider
    api_calls: AtomicUsize,

    /// Provider calls that failed, one per attempt
    api_failures: AtomicUsize,

    /// Provider results discarded because they broke placeholders or tags
    validation_rejections: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            cache_hits: AtomicUsize::new(0),
            cache_misses: AtomicUsize::new(0),
            coalesced_waits: AtomicUsize::new(0),
            fallback_hits: AtomicUsize::new(0),
            api_calls: AtomicUsize::new(0),
            api_failures: AtomicUsize::new(0),
            validation_rejections: AtomicUsize::new(0),
        }
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced_wait(&self) {
        self.coalesced_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback_hit(&self) {
        self.fallback_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_api_failure(&self) {
        self.api_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_validation_rejection(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn coalesced_waits(&self) -> usize {
        self.coalesced_waits.load(Ordering::Relaxed)
    }

    pub fn fallback_hits(&self) -> usize {
        self.fallback_hits.load(Ordering::Relaxed)
    }

    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn api_failures(&self) -> usize {
        self.api_failures.load(Ordering::Relaxed)
    }

    pub fn validation_rejections(&self) -> usize {
        self.validation_rejections.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let coalesced = self.coalesced_waits();
        // Coalesced waits were served without their own computation.
        let served_without_compute = hits + coalesced;
        let total_cache_queries = served_without_compute + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (served_without_compute as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.api_calls();
        let failures = self.api_failures();
        let api_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            started_at: self.started_at,
            cache_hits: hits,
            cache_misses: misses,
            coalesced_waits: coalesced,
            cache_hit_rate,
            fallback_hits: self.fallback_hits(),
            api_calls: calls,
            api_failures: failures,
            api_success_rate,
            validation_rejections: self.validation_rejections(),
        }
    }
}

impl Default for TranslationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the translation counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub started_at: DateTime<Utc>,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub coalesced_waits: usize,

    /// Percentage (0-100) of lookups answered without a new computation
    pub cache_hit_rate: f64,

    pub fallback_hits: usize,
    pub api_calls: usize,
    pub api_failures: usize,

    /// Percentage (0-100) of provider calls that produced a translation
    pub api_success_rate: f64,

    pub validation_rejections: usize,
}
