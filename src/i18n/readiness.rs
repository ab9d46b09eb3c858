//! Readiness gate for translation-dependent content.
//!
//! After a client-side navigation the new messages may not be committed yet,
//! and lookups return raw keys for a short while. The gate probes one key,
//! waits a bounded number of short delays for a real translation, and then
//! reports ready no matter what. It never blocks rendering indefinitely.

use crate::i18n::{Namespace, Probe};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }
}

/// Timing of the gate's re-checks.
#[derive(Debug, Clone)]
pub struct ReadinessConfig {
    /// Delay before each re-check
    pub recheck_delay: Duration,
    /// Re-checks after the immediate probe before forcing ready
    pub max_rechecks: u32,
    /// Values starting with one of these count as untranslated, in
    /// addition to `"<namespace>."`
    pub fallback_prefixes: Vec<String>,
}

impl ReadinessConfig {
    pub fn new(recheck_delay: Duration) -> Self {
        Self {
            recheck_delay,
            max_rechecks: 1,
            fallback_prefixes: Vec::new(),
        }
    }

    pub fn with_max_rechecks(mut self, max_rechecks: u32) -> Self {
        self.max_rechecks = max_rechecks;
        self
    }

    pub fn with_fallback_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fallback_prefixes.push(prefix.into());
        self
    }
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self::new(Duration::from_millis(50))
    }
}

/// Whether a probed value looks like a real translation.
pub fn is_translated(value: &str, raw_key: &str, fallback_prefixes: &[String]) -> bool {
    value != raw_key
        && !fallback_prefixes
            .iter()
            .any(|prefix| value.starts_with(prefix.as_str()))
}

/// One mounted gate. Dropping it cancels any pending re-check.
pub struct ReadinessGate<P: Probe> {
    probe: Arc<P>,
    config: ReadinessConfig,
    namespace: Namespace,
    probe_key: String,
    state: watch::Receiver<Readiness>,
    checks: Arc<AtomicU32>,
    translated: Arc<AtomicBool>,
    pending: Option<JoinHandle<()>>,
}

impl<P: Probe> ReadinessGate<P> {
    /// Mount the gate and run the immediate probe.
    ///
    /// Re-checks run on the current tokio runtime. Without one the gate
    /// settles to ready right away.
    pub fn mount(
        probe: Arc<P>,
        namespace: Namespace,
        probe_key: impl Into<String>,
        config: ReadinessConfig,
    ) -> Self {
        let (_, state) = watch::channel(Readiness::NotReady);
        let mut gate = Self {
            probe,
            config,
            namespace,
            probe_key: probe_key.into(),
            state,
            checks: Arc::new(AtomicU32::new(0)),
            translated: Arc::new(AtomicBool::new(false)),
            pending: None,
        };
        gate.start();
        gate
    }

    /// Change the probed namespace or key.
    ///
    /// Cancels the pending re-check and restarts from `NotReady`.
    pub fn set_inputs(&mut self, namespace: Namespace, probe_key: impl Into<String>) {
        self.cancel();
        self.namespace = namespace;
        self.probe_key = probe_key.into();
        self.start();
    }

    /// Tear the gate down without applying any pending re-check.
    pub fn unmount(mut self) {
        self.cancel();
    }

    pub fn state(&self) -> Readiness {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state().is_ready()
    }

    /// Number of probes run since the last (re)start.
    pub fn checks(&self) -> u32 {
        self.checks.load(Ordering::SeqCst)
    }

    /// Whether a probe saw a real translation, as opposed to the gate
    /// settling because it ran out of re-checks.
    pub fn saw_translation(&self) -> bool {
        self.translated.load(Ordering::SeqCst)
    }

    /// Wait until the gate settles.
    pub async fn wait_ready(&self) -> Readiness {
        let mut state = self.state.clone();
        // Only a cancelled check closes the channel; report what we have then.
        let _ = state.wait_for(|readiness| readiness.is_ready()).await;
        let readiness = *state.borrow();
        readiness
    }

    fn raw_key(&self) -> String {
        format!("{}.{}", self.namespace, self.probe_key)
    }

    fn start(&mut self) {
        let raw_key = self.raw_key();
        let mut prefixes = self.config.fallback_prefixes.clone();
        prefixes.push(format!("{}.", self.namespace));

        let checks = Arc::new(AtomicU32::new(0));
        self.checks = Arc::clone(&checks);
        let translated = Arc::new(AtomicBool::new(false));
        self.translated = Arc::clone(&translated);

        let check = {
            let probe = Arc::clone(&self.probe);
            let raw_key = raw_key.clone();
            move || {
                checks.fetch_add(1, Ordering::SeqCst);
                let ok = is_translated(&probe.probe(&raw_key), &raw_key, &prefixes);
                translated.store(ok, Ordering::SeqCst);
                ok
            }
        };

        if check() {
            debug!("Translations for '{}' ready on mount", raw_key);
            let (_, state) = watch::channel(Readiness::Ready);
            self.state = state;
            return;
        }

        let Ok(runtime) = Handle::try_current() else {
            warn!(
                "No async runtime to re-check '{}', rendering without waiting",
                raw_key
            );
            let (_, state) = watch::channel(Readiness::Ready);
            self.state = state;
            return;
        };

        let (tx, state) = watch::channel(Readiness::NotReady);
        self.state = state;

        let delay = self.config.recheck_delay;
        let max_rechecks = self.config.max_rechecks;
        self.pending = Some(runtime.spawn(async move {
            for attempt in 1..=max_rechecks {
                sleep(delay).await;
                if check() {
                    debug!("Translations for '{}' ready after re-check {}", raw_key, attempt);
                    tx.send_replace(Readiness::Ready);
                    return;
                }
            }
            debug!(
                "Translations for '{}' still missing after {} re-checks, rendering anyway",
                raw_key, max_rechecks
            );
            tx.send_replace(Readiness::Ready);
        }));
    }

    fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl<P: Probe> Drop for ReadinessGate<P> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{
        FnProbe, Locale, MessageBundle, MessageProvider, NavigationSlot, ResolvedMessageSet,
    };
    use std::sync::atomic::AtomicUsize;

    fn mount_default<P: Probe>(probe: Arc<P>, namespace: Namespace, key: &str) -> ReadinessGate<P> {
        ReadinessGate::mount(probe, namespace, key, ReadinessConfig::default())
    }

    fn counting_probe(
        answer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> (Arc<FnProbe<impl Fn(&str) -> String + Send + Sync + 'static>>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let probe = FnProbe(move |key: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            answer(key)
        });
        (Arc::new(probe), calls)
    }

    fn french_provider() -> MessageProvider {
        let mut messages = ResolvedMessageSet::new();
        messages.insert(
            Namespace::Landing,
            MessageBundle::from_json(r#"{"hero":{"title":"Apprenez un métier"}}"#).unwrap(),
        );
        MessageProvider::new(Locale::FRENCH, messages)
    }

    // ==================== Predicate Tests ====================

    #[test]
    fn test_is_translated() {
        let prefixes = vec!["common.".to_string()];
        assert!(is_translated("Accueil", "common.title", &prefixes));
        assert!(!is_translated("common.title", "common.title", &prefixes));
        assert!(!is_translated("common.loading", "landing.title", &prefixes));
    }

    #[test]
    fn test_config_builder() {
        let config = ReadinessConfig::default()
            .with_max_rechecks(3)
            .with_fallback_prefix("common.");
        assert_eq!(config.recheck_delay, Duration::from_millis(50));
        assert_eq!(config.max_rechecks, 3);
        assert_eq!(config.fallback_prefixes, vec!["common.".to_string()]);
    }

    // ==================== Gate Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_ready_immediately_without_recheck() {
        let (probe, calls) = counting_probe(|_| "Apprenez".to_string());

        let gate = mount_default(probe, Namespace::Landing, "hero.title");

        assert!(gate.is_ready());
        assert!(gate.pending.is_none());

        sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.checks(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_never_resolving_probe_is_forced_ready_after_delay() {
        let (probe, calls) = counting_probe(|key| key.to_string());

        let gate = mount_default(probe, Namespace::Landing, "hero.title");
        assert_eq!(gate.state(), Readiness::NotReady);

        sleep(Duration::from_millis(49)).await;
        assert!(!gate.is_ready());

        assert_eq!(gate.wait_ready().await, Readiness::Ready);
        assert!(!gate.saw_translation());
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(gate.checks(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_prefix_counts_as_not_ready() {
        let (probe, calls) = counting_probe(|_| "common.loading".to_string());
        let config = ReadinessConfig::default().with_fallback_prefix("common.");

        let gate = ReadinessGate::mount(probe, Namespace::Courses, "title", config);
        assert!(!gate.is_ready());

        gate.wait_ready().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigation_commit_before_recheck() {
        let slot = Arc::new(NavigationSlot::new());

        let gate = ReadinessGate::mount(
            Arc::clone(&slot),
            Namespace::Landing,
            "hero.title",
            ReadinessConfig::default(),
        );
        assert!(!gate.is_ready());

        slot.commit(french_provider());

        assert_eq!(gate.wait_ready().await, Readiness::Ready);
        assert_eq!(gate.checks(), 2);
        assert!(gate.saw_translation());
        assert_eq!(slot.probe("landing.hero.title"), "Apprenez un métier");
    }

    #[test]
    fn test_mount_outside_runtime_settles_ready() {
        let slot = Arc::new(NavigationSlot::new());

        let gate = mount_default(Arc::clone(&slot), Namespace::Landing, "hero.title");

        assert_eq!(gate.state(), Readiness::Ready);
        assert!(!gate.saw_translation());
        assert!(gate.pending.is_none());
        assert_eq!(gate.checks(), 1);
    }

    #[test]
    fn test_set_inputs_outside_runtime_settles_ready() {
        let (probe, calls) = counting_probe(|key| {
            if key == "landing.hero.title" {
                "Apprenez".to_string()
            } else {
                key.to_string()
            }
        });

        let mut gate = mount_default(probe, Namespace::Landing, "hero.title");
        assert!(gate.saw_translation());

        gate.set_inputs(Namespace::Auth, "title");
        assert!(gate.is_ready());
        assert!(!gate.saw_translation());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_pending_recheck() {
        let (probe, calls) = counting_probe(|key| key.to_string());

        let gate = mount_default(probe, Namespace::Auth, "login.title");
        let state = gate.state.clone();
        gate.unmount();

        sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*state.borrow(), Readiness::NotReady);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_recheck() {
        let (probe, calls) = counting_probe(|key| key.to_string());

        {
            let _gate = mount_default(probe, Namespace::Auth, "title");
        }

        sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_inputs_restarts_and_drops_old_recheck() {
        let (probe, calls) = counting_probe(|key| {
            if key == "landing.hero.title" {
                "Apprenez".to_string()
            } else {
                key.to_string()
            }
        });

        let mut gate = mount_default(probe, Namespace::Auth, "title");
        assert!(!gate.is_ready());

        gate.set_inputs(Namespace::Landing, "hero.title");
        assert!(gate.is_ready());
        assert_eq!(gate.checks(), 1);

        sleep(Duration::from_secs(1)).await;
        // One probe per mount, the old re-check never ran
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_inputs_goes_back_to_not_ready() {
        let (probe, _calls) = counting_probe(|key| {
            if key == "landing.hero.title" {
                "Apprenez".to_string()
            } else {
                key.to_string()
            }
        });

        let mut gate = mount_default(probe, Namespace::Landing, "hero.title");
        assert!(gate.is_ready());

        gate.set_inputs(Namespace::Courses, "title");
        assert_eq!(gate.state(), Readiness::NotReady);
        assert_eq!(gate.wait_ready().await, Readiness::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configurable_recheck_count() {
        let (probe, calls) = counting_probe(|key| key.to_string());
        let config = ReadinessConfig::new(Duration::from_millis(20)).with_max_rechecks(3);

        let gate = ReadinessGate::mount(probe, Namespace::Common, "title", config);

        sleep(Duration::from_millis(50)).await;
        assert!(!gate.is_ready());

        gate.wait_ready().await;
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_rechecks_forces_ready_without_waiting() {
        let (probe, calls) = counting_probe(|key| key.to_string());
        let config = ReadinessConfig::default().with_max_rechecks(0);

        let gate = ReadinessGate::mount(probe, Namespace::Common, "title", config);

        assert_eq!(gate.wait_ready().await, Readiness::Ready);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
