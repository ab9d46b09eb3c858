//! Message provider: the `{locale, messages}` pair a render works against.
//!
//! Lookups never fail. A key without a translation comes back unchanged, so
//! the page degrades to showing the key path instead of erroring.

use crate::i18n::{
    resolve_locale, resolve_locale_deferred, BundleSource, I18nError, I18nMetrics, Locale,
    Namespace, NamespaceLoader, ResolvedMessageSet,
};
use regex::{Captures, Regex};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::sync::watch;
use tracing::{debug, trace};

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("Invalid placeholder regex"))
}

/// Replace `{name}` placeholders with matching arguments.
///
/// Placeholders with no matching argument are left as written.
pub fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            args.iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Resolved messages for one request or navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageProvider {
    locale: Locale,
    messages: ResolvedMessageSet,
}

/// Serializable view handed to the rendering layer.
#[derive(Debug, Serialize)]
pub struct ProviderPayload<'a> {
    pub locale: Locale,
    pub messages: &'a ResolvedMessageSet,
}

impl MessageProvider {
    pub fn new(locale: Locale, messages: ResolvedMessageSet) -> Self {
        Self { locale, messages }
    }

    /// Resolve the hint and load its namespaces.
    ///
    /// An invalid hint fails before the loader is touched.
    pub async fn resolve<S: BundleSource>(
        hint: Option<&str>,
        loader: &NamespaceLoader<S>,
    ) -> Result<Self, I18nError> {
        let locale = resolve_locale(hint)?;
        Ok(Self::load(locale, loader).await)
    }

    /// Same as [`MessageProvider::resolve`] for a hint that is not known yet.
    pub async fn resolve_deferred<F, S>(
        hint: F,
        loader: &NamespaceLoader<S>,
    ) -> Result<Self, I18nError>
    where
        F: Future<Output = Option<String>>,
        S: BundleSource,
    {
        let locale = resolve_locale_deferred(hint).await?;
        Ok(Self::load(locale, loader).await)
    }

    async fn load<S: BundleSource>(locale: Locale, loader: &NamespaceLoader<S>) -> Self {
        let messages = loader.load(locale).await;
        debug!(
            "Message provider ready for '{}' ({} namespaces)",
            locale,
            messages.loaded_namespaces().len()
        );
        Self::new(locale, messages)
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn messages(&self) -> &ResolvedMessageSet {
        &self.messages
    }

    pub fn payload(&self) -> ProviderPayload<'_> {
        ProviderPayload {
            locale: self.locale,
            messages: &self.messages,
        }
    }

    /// Translation for a `"<namespace>.<path>"` key, if there is one.
    pub fn get(&self, key: &str) -> Option<&str> {
        let (namespace, path) = key.split_once('.')?;
        let namespace: Namespace = namespace.parse().ok()?;
        self.messages.lookup(namespace, path)
    }

    /// Translate a `"<namespace>.<path>"` key, or return the key itself.
    pub fn t(&self, key: &str) -> String {
        record_lookup(self.get(key), key)
    }

    /// Translate and fill `{name}` placeholders.
    pub fn t_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.t(key), args)
    }

    /// Lookups scoped to one namespace.
    pub fn translator(&self, namespace: Namespace) -> Translator<'_> {
        Translator {
            provider: self,
            namespace,
        }
    }
}

fn record_lookup(found: Option<&str>, raw_key: &str) -> String {
    let metrics = I18nMetrics::global();
    match found {
        Some(value) => {
            metrics.record_lookup_hit();
            value.to_string()
        }
        None => {
            metrics.record_lookup_miss();
            trace!("Missing translation for '{}'", raw_key);
            raw_key.to_string()
        }
    }
}

/// Namespace-scoped lookups, `t("hero.title")` within `landing`.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    provider: &'a MessageProvider,
    namespace: Namespace,
}

impl Translator<'_> {
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Translate a path in this namespace. Misses return the fully
    /// qualified `"<namespace>.<path>"` key.
    pub fn t(&self, path: &str) -> String {
        let found = self.provider.messages.lookup(self.namespace, path);
        if found.is_some() {
            return record_lookup(found, path);
        }
        record_lookup(None, &format!("{}.{}", self.namespace, path))
    }

    pub fn t_with(&self, path: &str, args: &[(&str, &str)]) -> String {
        interpolate(&self.t(path), args)
    }
}

/// Something a readiness probe can ask for a translation.
///
/// Must behave like `t`: return the raw key when nothing is available.
pub trait Probe: Send + Sync + 'static {
    fn probe(&self, key: &str) -> String;
}

impl Probe for MessageProvider {
    fn probe(&self, key: &str) -> String {
        self.t(key)
    }
}

impl<T: Probe + ?Sized> Probe for Arc<T> {
    fn probe(&self, key: &str) -> String {
        (**self).probe(key)
    }
}

/// Adapts a plain lookup function into a [`Probe`].
pub struct FnProbe<F>(pub F);

impl<F> Probe for FnProbe<F>
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    fn probe(&self, key: &str) -> String {
        (self.0)(key)
    }
}

/// The provider of the current client-side navigation.
///
/// A navigation commits a new provider wholesale. Until the first commit,
/// or after `clear`, every lookup returns its raw key.
#[derive(Clone)]
pub struct NavigationSlot {
    current: Arc<watch::Sender<Option<Arc<MessageProvider>>>>,
}

impl NavigationSlot {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            current: Arc::new(tx),
        }
    }

    /// Replace the current provider.
    pub fn commit(&self, provider: MessageProvider) {
        debug!("Committing messages for '{}'", provider.locale());
        self.current.send_replace(Some(Arc::new(provider)));
    }

    /// Drop the current provider, e.g. when a navigation starts.
    pub fn clear(&self) {
        self.current.send_replace(None);
    }

    pub fn current(&self) -> Option<Arc<MessageProvider>> {
        self.current.borrow().clone()
    }
}

impl Default for NavigationSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for NavigationSlot {
    fn probe(&self, key: &str) -> String {
        match self.current() {
            Some(provider) => provider.t(key),
            None => key.to_string(),
        }
    }
}
