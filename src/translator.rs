use crate::config::Config;
use crate::i18n::{TranslationMetrics, TranslationValidator};
use crate::retry::{with_retry_if, RetryConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// LibreTranslate-compatible translation request
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

/// Failure talking to the translation provider.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("translation provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed translation response: {0}")]
    Malformed(String),
}

impl TranslateError {
    /// Network errors, rate limits and 5xx responses may succeed on retry;
    /// other client errors and bad payloads will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TranslateError::Transport(_) => true,
            TranslateError::Status { status, .. } => *status == 429 || *status >= 500,
            TranslateError::Malformed(_) => false,
        }
    }
}

/// Client for the remote translation provider.
#[derive(Clone)]
pub struct RemoteTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    source_language: String,
    retry: RetryConfig,
    metrics: Arc<TranslationMetrics>,
}

impl RemoteTranslator {
    /// The client should carry the request timeout; see [`build_http_client`].
    pub fn new(
        client: reqwest::Client,
        config: &Config,
        source_language: &str,
        metrics: Arc<TranslationMetrics>,
    ) -> Self {
        Self {
            client,
            api_url: config.translate_api_url.clone(),
            api_key: config.translate_api_key.clone(),
            source_language: source_language.to_string(),
            retry: RetryConfig::translation(config.translate_max_attempts),
            metrics,
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Translate `text` into `target`.
    pub async fn translate(&self, text: &str, target: &str) -> Result<String, TranslateError> {
        let request = TranslateRequest {
            q: text,
            source: &self.source_language,
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        with_retry_if(
            &self.retry,
            &format!("Translation to {}", target),
            || async {
                self.metrics.record_api_call();
                let result = self.send_once(&request).await;
                if result.is_err() {
                    self.metrics.record_api_failure();
                }
                result
            },
            TranslateError::is_retryable,
        )
        .await
    }

    /// One provider round trip, without retries.
    async fn send_once(&self, request: &TranslateRequest<'_>) -> Result<String, TranslateError> {
        let response = self.client.post(&self.api_url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: TranslateResponse =
            serde_json::from_str(&body).map_err(|e| TranslateError::Malformed(e.to_string()))?;

        parsed
            .translated_text
            .ok_or_else(|| TranslateError::Malformed("missing translatedText".to_string()))
    }

    /// Best-effort translation: any failure yields `text` unchanged.
    ///
    /// Results that break placeholders, nesting references or tags are
    /// discarded as well.
    pub async fn translate_or_source(&self, text: &str, target: &str) -> String {
        if text.trim().is_empty() || target.eq_ignore_ascii_case(&self.source_language) {
            return text.to_string();
        }

        let translated = match self.translate(text, target).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!(locale = target, error = %e, "Translation failed, using source text");
                return text.to_string();
            }
        };

        let report = TranslationValidator::validate(text, &translated);
        if report.has_errors() {
            self.metrics.record_validation_rejection();
            warn!(
                locale = target,
                errors = ?report.errors,
                "Rejected translation that breaks runtime tokens, using source text"
            );
            return text.to_string();
        }
        if report.has_warnings() {
            debug!(locale = target, warnings = ?report.warnings, "Translation validation warnings");
        }

        translated
    }
}

/// HTTP client for provider calls, bounded by the configured timeout.
pub fn build_http_client(config: &Config) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.translate_timeout)
        .build()
}
