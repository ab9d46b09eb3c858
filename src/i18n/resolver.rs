//! Locale resolution for incoming requests.
//!
//! A request carries a locale hint (URL segment, cookie, negotiated header).
//! The hint either names a supported locale or the request is a not-found.
//! There is no correction and no default-locale substitution here; callers
//! that want a default must supply it as the hint themselves.

use crate::i18n::{I18nMetrics, Locale, LocaleRegistry};
use std::future::Future;
use thiserror::Error;
use tracing::debug;

/// Errors that reach the caller of the message pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum I18nError {
    /// The hint was absent or not a supported locale. Render as 404.
    #[error("locale not found: {}", .hint.as_deref().unwrap_or("<none>"))]
    LocaleNotFound { hint: Option<String> },
}

/// Validate a locale hint against the supported set.
pub fn resolve_locale(hint: Option<&str>) -> Result<Locale, I18nError> {
    let metrics = I18nMetrics::global();

    let resolved = hint
        .filter(|code| !code.is_empty())
        .and_then(|code| Locale::from_code(code).ok());

    match resolved {
        Some(locale) => {
            metrics.record_locale_resolved();
            Ok(locale)
        }
        None => {
            debug!("Rejecting locale hint {:?}", hint);
            metrics.record_locale_rejected();
            Err(I18nError::LocaleNotFound {
                hint: hint.map(str::to_string),
            })
        }
    }
}

/// Await a deferred hint (e.g. negotiated from headers), then validate it.
pub async fn resolve_locale_deferred<F>(hint: F) -> Result<Locale, I18nError>
where
    F: Future<Output = Option<String>>,
{
    let hint = hint.await;
    resolve_locale(hint.as_deref())
}

/// Pick a hint from an `Accept-Language` header value.
///
/// Entries are ranked by q-value (ties keep header order) and the first one
/// whose primary subtag is a supported code wins. `q=0` entries are
/// refused. Returns `None` when nothing matches; the resolver then rejects.
pub fn negotiate_accept_language(header: &str) -> Option<String> {
    let mut ranked: Vec<(usize, f32, &str)> = header
        .split(',')
        .enumerate()
        .filter_map(|(position, entry)| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let quality = parts
                .find_map(|param| param.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                .unwrap_or(1.0);
            Some((position, quality, tag))
        })
        .filter(|(_, quality, _)| *quality > 0.0)
        .collect();

    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let registry = LocaleRegistry::get();
    ranked.into_iter().find_map(|(_, _, tag)| {
        let primary = tag.split('-').next().unwrap_or(tag).to_ascii_lowercase();
        registry
            .is_enabled(&primary)
            .then_some(primary)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ==================== resolve_locale Tests ====================

    #[test]
    fn test_resolve_supported_locales() {
        assert_eq!(resolve_locale(Some("fr")), Ok(Locale::FRENCH));
        assert_eq!(resolve_locale(Some("en")), Ok(Locale::ENGLISH));
    }

    #[test]
    fn test_resolve_absent_is_not_found() {
        assert_eq!(
            resolve_locale(None),
            Err(I18nError::LocaleNotFound { hint: None })
        );
    }

    #[test]
    fn test_resolve_empty_is_not_found() {
        assert_eq!(
            resolve_locale(Some("")),
            Err(I18nError::LocaleNotFound {
                hint: Some(String::new())
            })
        );
    }

    #[test]
    fn test_resolve_unsupported_is_not_corrected() {
        for hint in ["de", "FR", "en-US", " en", "english"] {
            assert!(resolve_locale(Some(hint)).is_err(), "{hint} should be rejected");
        }
    }

    #[test]
    fn test_not_found_message_names_hint() {
        let err = resolve_locale(Some("xx")).unwrap_err();
        assert_eq!(err.to_string(), "locale not found: xx");

        let err = resolve_locale(None).unwrap_err();
        assert_eq!(err.to_string(), "locale not found: <none>");
    }

    // ==================== Deferred Tests ====================

    #[tokio::test]
    async fn test_resolve_deferred_supported() {
        let locale = resolve_locale_deferred(async { Some("en".to_string()) }).await;
        assert_eq!(locale, Ok(Locale::ENGLISH));
    }

    #[tokio::test]
    async fn test_resolve_deferred_absent() {
        let result = resolve_locale_deferred(async { None }).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_deferred_with_block_on() {
        let result = tokio_test::block_on(resolve_locale_deferred(async {
            tokio::task::yield_now().await;
            Some("fr".to_string())
        }));
        assert_eq!(result, Ok(Locale::FRENCH));
    }

    // ==================== Negotiation Tests ====================

    #[test]
    fn test_negotiate_picks_first_supported() {
        assert_eq!(
            negotiate_accept_language("de-DE,en-US;q=0.8,fr;q=0.5"),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_negotiate_respects_quality_order() {
        assert_eq!(
            negotiate_accept_language("en;q=0.4, fr-CA;q=0.9"),
            Some("fr".to_string())
        );
    }

    #[test]
    fn test_negotiate_ties_keep_header_order() {
        assert_eq!(
            negotiate_accept_language("en, fr"),
            Some("en".to_string())
        );
    }

    #[test]
    fn test_negotiate_refuses_q_zero() {
        assert_eq!(negotiate_accept_language("fr;q=0, de"), None);
    }

    #[test]
    fn test_negotiate_nothing_supported() {
        assert_eq!(negotiate_accept_language("de, it;q=0.7"), None);
        assert_eq!(negotiate_accept_language(""), None);
        assert_eq!(negotiate_accept_language("*"), None);
    }

    // ==================== Property Tests ====================

    proptest! {
        #[test]
        fn prop_unsupported_codes_are_rejected(code in "\\PC*") {
            prop_assume!(code != "fr" && code != "en");
            prop_assert!(resolve_locale(Some(&code)).is_err());
        }

        #[test]
        fn prop_negotiated_hint_always_resolves(header in "[a-zA-Z,;=.0-9 -]{0,40}") {
            if let Some(hint) = negotiate_accept_language(&header) {
                prop_assert!(resolve_locale(Some(&hint)).is_ok());
            }
        }
    }
}
