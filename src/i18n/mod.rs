//! Internationalization (i18n) pipeline for the course catalogue.
//!
//! Every page render goes through the same steps: resolve the request's
//! locale, load that locale's message namespaces, and hand the resulting
//! `{locale, messages}` pair to the renderer. Client-side navigations add a
//! readiness gate on top so untranslated keys do not flash on screen.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for the supported locales
//! - `locale`: Validated `Locale` type
//! - `namespace`: Closed set of message namespaces
//! - `bundle`: Per-(locale, namespace) key tree with dotted lookups
//! - `source`: `BundleSource` trait with filesystem, HTTP, memory and cached backends
//! - `resolver`: Locale hint validation and `Accept-Language` negotiation
//! - `loader`: Isolated, concurrent namespace loading
//! - `messages`: Resolved message set of one request
//! - `provider`: Key lookup, interpolation and the navigation slot
//! - `readiness`: Readiness gate for client-side navigations
//! - `validator`: Catalogue audit against the source locale
//! - `metrics`: Resolution and lookup counters
//!
//! # Example
//!
//! ```rust,ignore
//! use catalog_i18n::i18n::{FsBundleSource, MessageProvider, NamespaceLoader};
//!
//! let loader = NamespaceLoader::new(FsBundleSource::new("messages"));
//! let provider = MessageProvider::resolve(Some("fr"), &loader).await?;
//! let title = provider.t("common.title");
//! ```

mod bundle;
mod loader;
mod locale;
mod messages;
mod metrics;
mod namespace;
mod provider;
mod readiness;
mod registry;
mod resolver;
mod source;
mod validator;

pub use bundle::{BundleError, MessageBundle};
pub use loader::NamespaceLoader;
pub use locale::{Locale, UnsupportedLocale};
pub use messages::ResolvedMessageSet;
pub use metrics::{I18nMetrics, MetricsReport};
pub use namespace::{Namespace, UnknownNamespace};
pub use provider::{
    interpolate, FnProbe, MessageProvider, NavigationSlot, Probe, ProviderPayload, Translator,
};
pub use readiness::{is_translated, Readiness, ReadinessConfig, ReadinessGate};
pub use registry::{LocaleConfig, LocaleRegistry};
pub use resolver::{negotiate_accept_language, resolve_locale, resolve_locale_deferred, I18nError};
pub use source::{
    BundleSource, CachedBundleSource, FsBundleSource, HttpBundleSource, LoadError,
    MemoryBundleSource,
};
pub use validator::{AuditReport, CatalogAuditor};
