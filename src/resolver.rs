//! Builds the bundle served by `GET /api/translate`.
//!
//! Resolution order for `(locale, namespace)`:
//!
//! 1. the bundle cache,
//! 2. the fallback dictionary,
//! 3. the locale's own static file, when the registry marks it native,
//! 4. per-string remote translation of the base-language bundle.
//!
//! Steps 2-4 run at most once per key at a time and their result is cached.
//! Resolution never fails; the worst case is the base-language text.

use crate::cache::{cache_key, BundleCache, CacheStatus};
use crate::config::Config;
use crate::i18n::{Bundle, BundleStore, FallbackDictionary, LocaleRegistry, TranslationMetrics};
use crate::translator::RemoteTranslator;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, info};

/// Where a freshly computed bundle came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleOrigin {
    Fallback,
    Static,
    Remote,
}

/// A resolved bundle and how the cache answered.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub bundle: Arc<Bundle>,
    pub status: CacheStatus,
}

pub struct TranslationResolver {
    cache: BundleCache,
    store: BundleStore,
    translator: RemoteTranslator,
    metrics: Arc<TranslationMetrics>,
    base_locale: String,
    concurrency: usize,
}

impl TranslationResolver {
    pub fn new(
        config: &Config,
        translator: RemoteTranslator,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            cache: BundleCache::new(config.cache_capacity, config.cache_ttl),
            store: BundleStore::new(config.locale_root.clone()),
            base_locale: translator.source_language().to_string(),
            translator,
            metrics,
            concurrency: config.translate_concurrency.max(1),
        }
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    pub fn cache(&self) -> &BundleCache {
        &self.cache
    }

    pub fn store(&self) -> &BundleStore {
        &self.store
    }

    /// Resolve the bundle for `locale` and `namespace`.
    ///
    /// `locale` is not validated against the registry; unknown codes fall
    /// through to remote translation and degrade to base-language text. It is
    /// case-folded so `ES` and `es` share one cache entry.
    pub async fn resolve(&self, locale: &str, namespace: &str) -> Resolution {
        let locale = locale.to_ascii_lowercase();
        let key = cache_key(&locale, namespace);

        let (bundle, status) = self
            .cache
            .get_or_resolve(&key, || self.compute(&locale, namespace))
            .await;

        match status {
            CacheStatus::Hit => self.metrics.record_cache_hit(),
            CacheStatus::Miss => self.metrics.record_cache_miss(),
            CacheStatus::Coalesced => self.metrics.record_coalesced_wait(),
        }
        debug!(key = %key, status = status.as_str(), keys = bundle.len(), "Resolved bundle");

        Resolution { bundle, status }
    }

    async fn compute(&self, locale: &str, namespace: &str) -> Bundle {
        let (bundle, origin) = self.compute_with_origin(locale, namespace).await;
        let language = LocaleRegistry::get()
            .get_by_code(locale)
            .map(|l| l.english_name)
            .unwrap_or("unregistered");
        info!(
            locale,
            language,
            namespace,
            origin = ?origin,
            keys = bundle.len(),
            "Built translation bundle"
        );
        bundle
    }

    async fn compute_with_origin(&self, locale: &str, namespace: &str) -> (Bundle, BundleOrigin) {
        if let Some(bundle) = FallbackDictionary::get().lookup(locale, namespace) {
            self.metrics.record_fallback_hit();
            return (bundle, BundleOrigin::Fallback);
        }

        if LocaleRegistry::get().is_native(locale) {
            let code = LocaleRegistry::get()
                .get_by_code(locale)
                .map(|l| l.code)
                .unwrap_or(self.base_locale.as_str());
            return (self.store.load(code, namespace).await, BundleOrigin::Static);
        }

        let base = self.store.load(&self.base_locale, namespace).await;
        (self.translate_bundle(base, locale).await, BundleOrigin::Remote)
    }

    /// Translate every value of `base`, keeping its key set exactly.
    async fn translate_bundle(&self, base: Bundle, target: &str) -> Bundle {
        stream::iter(base)
            .map(|(key, source)| async move {
                let translated = self.translator.translate_or_source(&source, target).await;
                (key, translated)
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}
