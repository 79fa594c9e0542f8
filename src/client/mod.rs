//! Storefront runtime binding: locale detection, bundle loading and lookups.

pub mod backend;
pub mod detect;
pub mod runtime;

pub use backend::{BundleSource, HttpBundleSource};
pub use detect::{
    detect_locale, normalize_tag, parse_accept_language, DetectedLocale, DetectionSource,
    DetectionSources, LanguagePreference,
};
pub use runtime::{I18nRuntime, RuntimeOptions};
