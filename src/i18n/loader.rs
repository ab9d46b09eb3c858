//! Namespace loading for a resolved locale.

use crate::i18n::{BundleSource, I18nMetrics, Locale, Namespace, ResolvedMessageSet};
use futures::future::join_all;
use tracing::{debug, warn};

/// Loads the configured namespaces of a locale from a bundle source.
///
/// Each namespace is attempted exactly once per call. A namespace that
/// fails is logged and left out; the call itself never fails.
pub struct NamespaceLoader<S> {
    source: S,
    namespaces: Vec<Namespace>,
}

impl<S: BundleSource> NamespaceLoader<S> {
    /// Loader for every namespace.
    pub fn new(source: S) -> Self {
        Self::with_namespaces(source, Namespace::ALL.to_vec())
    }

    /// Loader for a subset of namespaces. Duplicates are dropped.
    pub fn with_namespaces(source: S, mut namespaces: Vec<Namespace>) -> Self {
        namespaces.sort();
        namespaces.dedup();
        Self { source, namespaces }
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load every configured namespace concurrently.
    pub async fn load(&self, locale: Locale) -> ResolvedMessageSet {
        let metrics = I18nMetrics::global();

        let attempts = self.namespaces.iter().map(|&namespace| async move {
            metrics.record_namespace_load();
            (namespace, self.source.load_bundle(locale, namespace).await)
        });

        let mut messages = ResolvedMessageSet::new();
        for (namespace, result) in join_all(attempts).await {
            match result {
                Ok(bundle) => messages.insert(namespace, bundle),
                Err(e) => {
                    metrics.record_namespace_failure();
                    warn!(
                        "Skipping namespace '{}' for locale '{}': {}",
                        namespace, locale, e
                    );
                }
            }
        }

        debug!(
            "Loaded {}/{} namespaces for locale '{}'",
            messages.loaded_namespaces().len(),
            self.namespaces.len(),
            locale
        );

        messages
    }
}
