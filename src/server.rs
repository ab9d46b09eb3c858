//! HTTP surface: serves resolved message sets to the page renderer.
//!
//! An invalid locale is always a plain 404 with no messages attached.

use crate::config::Config;
use crate::i18n::{
    negotiate_accept_language, resolve_locale, BundleSource, CachedBundleSource, FsBundleSource,
    HttpBundleSource, I18nError, I18nMetrics, LoadError, Locale, LocaleRegistry, MessageProvider,
    Namespace, NamespaceLoader, ReadinessConfig,
};
use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<NamespaceLoader<Arc<dyn BundleSource>>>,
    pub readiness: ReadinessConfig,
}

impl AppState {
    pub fn new(source: Arc<dyn BundleSource>, readiness: ReadinessConfig) -> Self {
        Self {
            loader: Arc::new(NamespaceLoader::new(source)),
            readiness,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(build_source(config)?, config.readiness()))
    }
}

/// Pick the bundle source described by the configuration.
pub fn build_source(config: &Config) -> Result<Arc<dyn BundleSource>> {
    let source: Arc<dyn BundleSource> = match &config.messages_base_url {
        Some(url) => {
            info!(
                "Loading message bundles from {} (timeout {:?})",
                url,
                config.bundle_timeout()
            );
            let source = HttpBundleSource::with_timeout(url, config.bundle_timeout())
                .context("Failed to build bundle HTTP client")?;
            Arc::new(source)
        }
        None => {
            info!("Loading message bundles from {}", config.messages_dir);
            Arc::new(FsBundleSource::new(&config.messages_dir))
        }
    };

    if config.bundle_cache {
        Ok(Arc::new(CachedBundleSource::new(source)))
    } else {
        Ok(source)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/client-config", get(client_config))
        .route("/messages", get(negotiated_messages))
        .route("/:locale/messages", get(locale_messages))
        .route("/:locale/messages/:namespace", get(namespace_messages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process stops.
pub async fn serve(config: &Config) -> Result<()> {
    let app = router(AppState::from_config(config)?);
    let addr = format!("0.0.0.0:{}", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

fn error_response(status: StatusCode, error: &'static str, message: String) -> Response {
    (status, Json(ErrorBody { error, message })).into_response()
}

fn not_found(message: String) -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found", message)
}

/// Only a missing bundle is a 404; upstream and local failures are not.
fn load_error_response(error: &LoadError) -> Response {
    match error {
        LoadError::NotFound { .. } => not_found(error.to_string()),
        LoadError::Http { .. } | LoadError::Transport { .. } => {
            error_response(StatusCode::BAD_GATEWAY, "upstream_error", error.to_string())
        }
        LoadError::Io { .. } | LoadError::Parse { .. } => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "bundle_error",
            error.to_string(),
        ),
    }
}

impl IntoResponse for I18nError {
    fn into_response(self) -> Response {
        not_found(self.to_string())
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn metrics() -> Json<crate::i18n::MetricsReport> {
    Json(I18nMetrics::global().report())
}

#[derive(Debug, Serialize)]
struct ClientConfig {
    locales: Vec<Locale>,
    source_locale: &'static str,
    namespaces: Vec<Namespace>,
    readiness_delay_ms: u64,
    readiness_max_rechecks: u32,
}

/// What a client needs to drive its own navigations and readiness gate.
async fn client_config(State(state): State<AppState>) -> Json<ClientConfig> {
    Json(ClientConfig {
        locales: Locale::all(),
        source_locale: LocaleRegistry::get().source().code,
        namespaces: state.loader.namespaces().to_vec(),
        readiness_delay_ms: state.readiness.recheck_delay.as_millis() as u64,
        readiness_max_rechecks: state.readiness.max_rechecks,
    })
}

async fn locale_messages(State(state): State<AppState>, Path(locale): Path<String>) -> Response {
    match MessageProvider::resolve(Some(&locale), &state.loader).await {
        Ok(provider) => Json(provider.payload()).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Messages for the locale negotiated from `Accept-Language`.
async fn negotiated_messages(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let hint = async move {
        headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok())
            .and_then(negotiate_accept_language)
    };

    match MessageProvider::resolve_deferred(hint, &state.loader).await {
        Ok(provider) => Json(provider.payload()).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn namespace_messages(
    State(state): State<AppState>,
    Path((locale, namespace)): Path<(String, String)>,
) -> Response {
    let locale = match resolve_locale(Some(&locale)) {
        Ok(locale) => locale,
        Err(e) => return e.into_response(),
    };

    let namespace: Namespace = match namespace.parse() {
        Ok(namespace) => namespace,
        Err(e) => return not_found(format!("{}", e)),
    };
    if !state.loader.namespaces().contains(&namespace) {
        return not_found(format!("namespace '{}' is not served", namespace));
    }

    match state.loader.source().load_bundle(locale, namespace).await {
        Ok(bundle) => Json(bundle).into_response(),
        Err(e) => {
            warn!("Namespace request failed: {}", e);
            load_error_response(&e)
        }
    }
}
