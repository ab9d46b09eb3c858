//! Bundle sources: where message bundles come from.
//!
//! The loader only sees the `BundleSource` trait. Bundles are located by the
//! `{locale}/{namespace}.json` convention on disk and over HTTP, or handed
//! over pre-parsed for embedded catalogues and tests.

use crate::i18n::bundle::{BundleError, MessageBundle};
use crate::i18n::{I18nMetrics, Locale, Namespace};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

/// Failure to load one bundle.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no '{namespace}' bundle for locale '{locale}'")]
    NotFound { locale: Locale, namespace: Namespace },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid '{namespace}' bundle for locale '{locale}': {source}")]
    Parse {
        locale: Locale,
        namespace: Namespace,
        #[source]
        source: BundleError,
    },

    #[error("bundle request to {url} failed with status {status}")]
    Http { url: String, status: u16 },

    #[error("bundle request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl LoadError {
    fn parse(locale: Locale, namespace: Namespace, source: BundleError) -> Self {
        LoadError::Parse {
            locale,
            namespace,
            source,
        }
    }
}

/// Anything that can produce the bundle of a (locale, namespace) pair.
#[async_trait]
pub trait BundleSource: Send + Sync {
    async fn load_bundle(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<MessageBundle, LoadError>;
}

#[async_trait]
impl<S: BundleSource + ?Sized> BundleSource for Arc<S> {
    async fn load_bundle(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<MessageBundle, LoadError> {
        (**self).load_bundle(locale, namespace).await
    }
}

/// Relative location of a bundle under a root.
fn bundle_path(locale: Locale, namespace: Namespace) -> String {
    format!("{}/{}.json", locale.code(), namespace.as_str())
}

// ==================== Filesystem ====================

/// Reads `{root}/{locale}/{namespace}.json`.
#[derive(Debug, Clone)]
pub struct FsBundleSource {
    root: PathBuf,
}

impl FsBundleSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl BundleSource for FsBundleSource {
    async fn load_bundle(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<MessageBundle, LoadError> {
        let path = self.root.join(bundle_path(locale, namespace));
        debug!("Reading bundle {}", path.display());

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LoadError::NotFound { locale, namespace })
            }
            Err(source) => return Err(LoadError::Io { path, source }),
        };

        MessageBundle::from_json(&raw).map_err(|e| LoadError::parse(locale, namespace, e))
    }
}

// ==================== HTTP ====================

/// Fetches `{base_url}/{locale}/{namespace}.json` from a translation CDN.
#[derive(Debug, Clone)]
pub struct HttpBundleSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBundleSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Source with its own client whose requests give up after `timeout`.
    ///
    /// A stalled bundle then fails as `LoadError::Transport` instead of
    /// holding back the other namespaces of the same load.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client, base_url))
    }
}

#[async_trait]
impl BundleSource for HttpBundleSource {
    async fn load_bundle(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<MessageBundle, LoadError> {
        let url = format!("{}/{}", self.base_url, bundle_path(locale, namespace));
        debug!("Fetching bundle {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| LoadError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LoadError::NotFound { locale, namespace });
        }
        if !status.is_success() {
            return Err(LoadError::Http {
                url,
                status: status.as_u16(),
            });
        }

        let raw = response
            .text()
            .await
            .map_err(|source| LoadError::Transport { url, source })?;

        MessageBundle::from_json(&raw).map_err(|e| LoadError::parse(locale, namespace, e))
    }
}

// ==================== In-memory ====================

/// Pre-parsed bundles, e.g. compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct MemoryBundleSource {
    bundles: HashMap<(Locale, Namespace), MessageBundle>,
}

impl MemoryBundleSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, locale: Locale, namespace: Namespace, bundle: MessageBundle) {
        self.bundles.insert((locale, namespace), bundle);
    }

    /// Builder-style insert from a JSON document.
    pub fn with_json(
        mut self,
        locale: Locale,
        namespace: Namespace,
        raw: &str,
    ) -> Result<Self, LoadError> {
        let bundle =
            MessageBundle::from_json(raw).map_err(|e| LoadError::parse(locale, namespace, e))?;
        self.insert(locale, namespace, bundle);
        Ok(self)
    }
}

#[async_trait]
impl BundleSource for MemoryBundleSource {
    async fn load_bundle(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<MessageBundle, LoadError> {
        self.bundles
            .get(&(locale, namespace))
            .cloned()
            .ok_or(LoadError::NotFound { locale, namespace })
    }
}

// ==================== Cross-request cache ====================

/// Publish-once cache in front of another source.
///
/// Every (locale, namespace) slot is allocated up front, so lookups never
/// mutate the map. A slot is written at most once, by the first successful
/// load; failures leave it empty and the next request tries again.
pub struct CachedBundleSource<S> {
    inner: S,
    slots: HashMap<(Locale, Namespace), OnceCell<MessageBundle>>,
}

impl<S: BundleSource> CachedBundleSource<S> {
    pub fn new(inner: S) -> Self {
        let slots = Locale::all()
            .into_iter()
            .flat_map(|locale| Namespace::ALL.map(|ns| ((locale, ns), OnceCell::new())))
            .collect();
        Self { inner, slots }
    }

    /// Whether the slot for this pair has been published.
    pub fn is_cached(&self, locale: Locale, namespace: Namespace) -> bool {
        self.slots
            .get(&(locale, namespace))
            .is_some_and(|slot| slot.initialized())
    }
}

#[async_trait]
impl<S: BundleSource> BundleSource for CachedBundleSource<S> {
    async fn load_bundle(
        &self,
        locale: Locale,
        namespace: Namespace,
    ) -> Result<MessageBundle, LoadError> {
        let Some(slot) = self.slots.get(&(locale, namespace)) else {
            return self.inner.load_bundle(locale, namespace).await;
        };

        let metrics = I18nMetrics::global();
        if let Some(bundle) = slot.get() {
            metrics.record_cache_hit();
            return Ok(bundle.clone());
        }

        metrics.record_cache_miss();
        slot.get_or_try_init(|| self.inner.load_bundle(locale, namespace))
            .await
            .cloned()
    }
}
