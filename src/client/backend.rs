//! Where the storefront runtime fetches bundles from.

use crate::i18n::{parse_bundle, Bundle};
use anyhow::{bail, Context, Result};
use std::future::Future;

/// Bundle loading seam for [`I18nRuntime`](super::I18nRuntime).
pub trait BundleSource: Send + Sync {
    /// Fetch the static file for `locale`/`namespace`.
    fn load_static(
        &self,
        locale: &str,
        namespace: &str,
    ) -> impl Future<Output = Result<Bundle>> + Send;

    /// Ask the translation service for a resolved bundle.
    fn resolve(&self, locale: &str, namespace: &str) -> impl Future<Output = Result<Bundle>> + Send;
}

/// Loads bundles from a running storefront over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBundleSource {
    client: reqwest::Client,
    base_url: String,
    locale_path: String,
}

impl HttpBundleSource {
    /// `base_url` is the storefront origin, e.g. `http://localhost:8080`.
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            locale_path: "/locales".to_string(),
        }
    }

    pub fn with_locale_path(mut self, path: &str) -> Self {
        self.locale_path = format!("/{}", path.trim_matches('/'));
        self
    }

    fn static_url(&self, locale: &str, namespace: &str) -> String {
        format!(
            "{}{}/{}/{}.json",
            self.base_url, self.locale_path, locale, namespace
        )
    }
}

impl BundleSource for HttpBundleSource {
    async fn load_static(&self, locale: &str, namespace: &str) -> Result<Bundle> {
        let url = self.static_url(locale, namespace);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("{} returned {}", url, status);
        }

        let body = response.text().await.context("Failed to read bundle body")?;
        parse_bundle(&body).with_context(|| format!("Invalid bundle at {}", url))
    }

    async fn resolve(&self, locale: &str, namespace: &str) -> Result<Bundle> {
        let url = format!("{}/api/translate", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("lng", locale), ("ns", namespace)])
            .send()
            .await
            .context("Failed to reach translation service")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Translation service returned {}", status);
        }

        response
            .json::<Bundle>()
            .await
            .context("Failed to parse resolved bundle")
    }
}
