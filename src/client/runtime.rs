//! Storefront-side translation runtime.
//!
//! One [`I18nRuntime`] per page session. [`I18nRuntime::init`] detects the
//! visitor's locale and loads bundles exactly once; lookups afterwards are
//! synchronous.

use super::backend::BundleSource;
use super::detect::{detect_locale, normalize_tag, DetectionSources, LanguagePreference};
use crate::i18n::{primary_subtag, Bundle, LocaleRegistry};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub default_locale: String,
    pub namespaces: Vec<String>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            namespaces: vec!["common".to_string()],
        }
    }
}

struct Session {
    locale: String,
    bundles: HashMap<String, Bundle>,
}

pub struct I18nRuntime<S> {
    source: S,
    options: RuntimeOptions,
    session: OnceCell<RwLock<Session>>,
}

impl<S: BundleSource> I18nRuntime<S> {
    pub fn new(source: S, options: RuntimeOptions) -> Self {
        Self {
            source,
            options,
            session: OnceCell::new(),
        }
    }

    /// Detect the locale and load its bundles. Returns the active locale.
    ///
    /// Only the first call does any work; later and concurrent calls wait for
    /// it and return the same locale.
    pub async fn init(&self, sources: &DetectionSources) -> String {
        let lock = self
            .session
            .get_or_init(|| async {
                let detected = detect_locale(sources, &self.options.default_locale);
                let locale = detected.language().to_string();
                info!(
                    locale = %locale,
                    tag = %detected.tag,
                    source = ?detected.source,
                    "Initializing translation runtime"
                );
                let bundles = self.load_bundles(&locale).await;
                RwLock::new(Session { locale, bundles })
            })
            .await;

        read(lock).locale.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.initialized()
    }

    /// Active locale, if initialized.
    pub fn language(&self) -> Option<String> {
        self.session.get().map(|lock| read(lock).locale.clone())
    }

    /// Look up `key` in `namespace`. Missing keys come back as the key itself.
    pub fn t(&self, namespace: &str, key: &str) -> String {
        let Some(lock) = self.session.get() else {
            debug!(namespace, key, "Lookup before runtime initialization");
            return key.to_string();
        };

        let session = read(lock);
        match session.bundles.get(namespace).and_then(|b| b.get(key)) {
            Some(value) => value.clone(),
            None => {
                warn!(
                    locale = %session.locale,
                    namespace,
                    key,
                    "Missing translation key"
                );
                key.to_string()
            }
        }
    }

    /// [`t`](Self::t) with `{{name}}` placeholders filled from `args`.
    /// Placeholders without a matching argument are left as they are.
    pub fn t_with(&self, namespace: &str, key: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.t(namespace, key), args)
    }

    /// Switch to `code`, reloading every namespace.
    ///
    /// Returns the preference the caller should persist (cookie and local
    /// storage) so the next visit detects the same locale.
    pub async fn change_language(&self, code: &str) -> LanguagePreference {
        let locale = normalize_tag(code)
            .map(|tag| primary_subtag(&tag).to_string())
            .unwrap_or_else(|| self.options.default_locale.clone());

        let bundles = self.load_bundles(&locale).await;
        let lock = self
            .session
            .get_or_init(|| async {
                RwLock::new(Session {
                    locale: locale.clone(),
                    bundles: HashMap::new(),
                })
            })
            .await;

        *write(lock) = Session {
            locale: locale.clone(),
            bundles,
        };
        info!(locale = %locale, "Language changed");

        LanguagePreference::new(locale)
    }

    async fn load_bundles(&self, locale: &str) -> HashMap<String, Bundle> {
        let loads = self.options.namespaces.iter().map(|namespace| async move {
            let bundle = self.load_namespace(locale, namespace).await;
            (namespace.clone(), bundle)
        });
        futures::future::join_all(loads).await.into_iter().collect()
    }

    async fn load_namespace(&self, locale: &str, namespace: &str) -> Bundle {
        let native = LocaleRegistry::get().is_native(locale);

        let mut bundle = match self.source.load_static(locale, namespace).await {
            Ok(bundle) => bundle,
            Err(e) if native => {
                warn!(locale, namespace, error = %e, "Failed to load static bundle");
                Bundle::new()
            }
            Err(e) => {
                debug!(locale, namespace, error = %e, "No static bundle");
                Bundle::new()
            }
        };

        if native {
            return bundle;
        }

        match self.source.resolve(locale, namespace).await {
            Ok(resolved) => {
                for (key, value) in resolved {
                    bundle.entry(key).or_insert(value);
                }
            }
            Err(e) => warn!(locale, namespace, error = %e, "Failed to resolve bundle"),
        }
        bundle
    }
}

fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let regex = PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").unwrap());

    regex
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            args.iter()
                .find(|(arg, _)| *arg == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn read(lock: &RwLock<Session>) -> RwLockReadGuard<'_, Session> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(lock: &RwLock<Session>) -> RwLockWriteGuard<'_, Session> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}
