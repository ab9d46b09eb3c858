//! Locale type: a language tag validated against the registry.
//!
//! A `Locale` can only be obtained through the registry, so holding one is
//! proof that the tag belongs to the supported set.

use crate::i18n::{LocaleConfig, LocaleRegistry};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Why a code could not become a `Locale`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnsupportedLocale {
    #[error("unknown locale code: '{0}'")]
    Unknown(String),

    #[error("locale '{0}' is not enabled")]
    Disabled(String),
}

/// A validated, supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locale {
    code: &'static str,
}

impl Locale {
    /// French, the source locale of the catalogue.
    pub const FRENCH: Locale = Locale { code: "fr" };

    /// English.
    pub const ENGLISH: Locale = Locale { code: "en" };

    /// Create a Locale from an exact language tag.
    ///
    /// # Returns
    /// * `Ok(Locale)` if the code is registered and enabled
    /// * `Err(UnsupportedLocale)` otherwise
    pub fn from_code(code: &str) -> Result<Locale, UnsupportedLocale> {
        match LocaleRegistry::get().get_by_code(code) {
            Some(config) if config.enabled => Ok(Locale { code: config.code }),
            Some(_) => Err(UnsupportedLocale::Disabled(code.to_string())),
            None => Err(UnsupportedLocale::Unknown(code.to_string())),
        }
    }

    /// Every enabled locale, in registry order.
    pub fn all() -> Vec<Locale> {
        LocaleRegistry::get()
            .list_enabled()
            .into_iter()
            .map(|config| Locale { code: config.code })
            .collect()
    }

    /// The locale translators author first.
    pub fn source() -> Locale {
        Locale {
            code: LocaleRegistry::get().source().code,
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full locale configuration from the registry.
    ///
    /// # Panics
    /// Never in practice: a `Locale` is only constructed from registry entries.
    pub fn config(&self) -> &'static LocaleConfig {
        LocaleRegistry::get()
            .get_by_code(self.code)
            .expect("Locale code should always be registered")
    }

    pub fn name(&self) -> &'static str {
        self.config().name
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn is_source(&self) -> bool {
        self.config().is_source
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}
