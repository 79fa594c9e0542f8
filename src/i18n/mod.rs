//! Internationalization (i18n) data for the storefront.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all locales and their display metadata
//! - `bundle`: Bundle type and the static translation files bundles are loaded from
//! - `fallback`: Hand-maintained translations consulted before the remote provider
//! - `validator`: Checks that machine translations keep placeholders and tags intact
//! - `metrics`: Counters for cache, fallback and provider behaviour
//!
//! # Example
//!
//! ```rust,ignore
//! use bookstore_i18n::i18n::{BundleStore, LocaleRegistry};
//!
//! let base = LocaleRegistry::get().base();
//! let bundle = BundleStore::new("locales").load(base.code, "common").await;
//! ```

mod bundle;
mod fallback;
mod metrics;
mod registry;
mod validator;

pub use bundle::{is_safe_segment, parse_bundle, Bundle, BundleStore};
pub use fallback::FallbackDictionary;
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{primary_subtag, Locale, LocaleRegistry, LocaleSummary};
pub use validator::{TranslationValidator, ValidationReport};
