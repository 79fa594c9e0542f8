//! HTTP surface of the translation service.

use crate::config::Config;
use crate::i18n::{LocaleRegistry, LocaleSummary, MetricsReport, TranslationMetrics};
use crate::resolver::TranslationResolver;
use crate::security::has_valid_api_key;
use crate::translator::{build_http_client, RemoteTranslator};
use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Response header describing how the bundle cache answered.
pub const CACHE_STATUS_HEADER: &str = "x-translation-cache";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<TranslationResolver>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let metrics = Arc::new(TranslationMetrics::new());
        let client = build_http_client(&config).context("Failed to build HTTP client")?;
        let base = LocaleRegistry::get().base();
        let translator = RemoteTranslator::new(client, &config, base.code, metrics.clone());
        let resolver = TranslationResolver::new(&config, translator, metrics);

        Ok(Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
        })
    }
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.locale_root);
    let locale_path = state.config.locale_path.clone();

    Router::new()
        .route("/health", get(health))
        .route("/api/translate", get(translate))
        .route("/api/translate/metrics", get(metrics))
        .route("/api/translate/cache", delete(clear_cache))
        .route("/api/languages", get(languages))
        .nest_service(&locale_path, static_files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = format!("0.0.0.0:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[derive(Debug, Deserialize)]
pub struct TranslateParams {
    lng: Option<String>,
    ns: Option<String>,
}

async fn health() -> &'static str {
    "OK"
}

/// `GET /api/translate?lng={locale}&ns={namespace}`
///
/// Always answers 200 with a bundle; missing parameters use the configured
/// defaults.
async fn translate(
    State(state): State<AppState>,
    Query(params): Query<TranslateParams>,
) -> Response {
    let locale = params
        .lng
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| state.config.default_locale.clone());
    let namespace = params
        .ns
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| state.config.default_namespace.clone());

    let resolution = state.resolver.resolve(&locale, &namespace).await;

    (
        [(
            HeaderName::from_static(CACHE_STATUS_HEADER),
            HeaderValue::from_static(resolution.status.as_str()),
        )],
        Json(resolution.bundle.as_ref().clone()),
    )
        .into_response()
}

async fn languages() -> Json<Vec<LocaleSummary>> {
    Json(
        LocaleRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|locale| locale.to_summary())
            .collect(),
    )
}

async fn metrics(State(state): State<AppState>) -> Json<MetricsReport> {
    Json(state.resolver.metrics().report())
}

async fn clear_cache(State(state): State<AppState>, headers: HeaderMap) -> StatusCode {
    let Some(expected) = state.config.api_key.as_deref() else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };
    if !has_valid_api_key(&headers, expected) {
        warn!("Rejected cache flush with invalid API key");
        return StatusCode::UNAUTHORIZED;
    }

    let removed = state.resolver.cache().clear();
    info!(removed, "Translation cache cleared");
    StatusCode::NO_CONTENT
}
