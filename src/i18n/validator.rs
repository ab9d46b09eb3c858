//! Message catalogue audit.
//!
//! Compares a locale's bundles against the source locale so that gaps show
//! up before they reach a page as raw keys.

use crate::i18n::provider::placeholder_regex;
use crate::i18n::{Locale, MessageBundle, Namespace, ResolvedMessageSet};
use serde::Serialize;
use std::collections::BTreeSet;

/// Findings of an audit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AuditReport {
    /// Keys or namespaces the candidate is missing
    pub errors: Vec<String>,

    /// Suspicious but renderable differences
    pub warnings: Vec<String>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }

    pub fn merge(&mut self, other: AuditReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Audits candidate bundles against reference bundles.
pub struct CatalogAuditor;

impl CatalogAuditor {
    /// Compare one namespace's bundles.
    ///
    /// - keys missing from the candidate are errors
    /// - extra keys, empty strings and placeholder mismatches are warnings
    pub fn audit_bundle(
        namespace: Namespace,
        reference: &MessageBundle,
        candidate: &MessageBundle,
    ) -> AuditReport {
        let mut report = AuditReport::new();

        let reference_keys: BTreeSet<String> = reference.keys().into_iter().collect();
        let candidate_keys: BTreeSet<String> = candidate.keys().into_iter().collect();

        for key in reference_keys.difference(&candidate_keys) {
            report
                .errors
                .push(format!("Missing key: {}.{}", namespace, key));
        }

        for key in candidate_keys.difference(&reference_keys) {
            report
                .warnings
                .push(format!("Extra key: {}.{}", namespace, key));
        }

        for key in reference_keys.intersection(&candidate_keys) {
            let (Some(expected), Some(actual)) = (reference.lookup(key), candidate.lookup(key))
            else {
                continue;
            };

            if actual.trim().is_empty() {
                report
                    .warnings
                    .push(format!("Empty translation: {}.{}", namespace, key));
                continue;
            }

            let expected_placeholders = Self::extract_placeholders(expected);
            let actual_placeholders = Self::extract_placeholders(actual);
            if expected_placeholders != actual_placeholders {
                report.warnings.push(format!(
                    "Placeholder mismatch in {}.{}: expected {:?}, found {:?}",
                    namespace, key, expected_placeholders, actual_placeholders
                ));
            }
        }

        report
    }

    /// Compare every namespace of two resolved sets.
    pub fn audit_sets(
        reference: &ResolvedMessageSet,
        locale: Locale,
        candidate: &ResolvedMessageSet,
    ) -> AuditReport {
        let mut report = AuditReport::new();

        for namespace in reference.loaded_namespaces() {
            let Some(reference_bundle) = reference.get(namespace) else {
                continue;
            };
            match candidate.get(namespace) {
                Some(candidate_bundle) => report.merge(Self::audit_bundle(
                    namespace,
                    reference_bundle,
                    candidate_bundle,
                )),
                None => report.errors.push(format!(
                    "Missing namespace '{}' for locale '{}'",
                    namespace, locale
                )),
            }
        }

        report
    }

    /// `{name}` placeholders used by a message.
    fn extract_placeholders(text: &str) -> BTreeSet<String> {
        placeholder_regex()
            .captures_iter(text)
            .map(|cap| cap[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(raw: &str) -> MessageBundle {
        MessageBundle::from_json(raw).unwrap()
    }

    // ==================== Placeholder Tests ====================

    #[test]
    fn test_extract_placeholders() {
        let found =
            CatalogAuditor::extract_placeholders("{count} formations, {count} avis de {name}");
        assert_eq!(
            found,
            BTreeSet::from(["count".to_string(), "name".to_string()])
        );
        assert!(CatalogAuditor::extract_placeholders("Aucune").is_empty());
    }

    // ==================== Bundle Audit Tests ====================

    #[test]
    fn test_identical_shape_is_clean() {
        let reference = bundle(r#"{"title":"Accueil","hero":{"cta":"Voir {count} formations"}}"#);
        let candidate = bundle(r#"{"title":"Home","hero":{"cta":"See {count} courses"}}"#);

        let report = CatalogAuditor::audit_bundle(Namespace::Landing, &reference, &candidate);
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_missing_key_is_error() {
        let reference = bundle(r#"{"title":"Accueil","subtitle":"Bienvenue"}"#);
        let candidate = bundle(r#"{"title":"Home"}"#);

        let report = CatalogAuditor::audit_bundle(Namespace::Common, &reference, &candidate);
        assert_eq!(report.errors, vec!["Missing key: common.subtitle"]);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_extra_key_is_warning() {
        let reference = bundle(r#"{"title":"Accueil"}"#);
        let candidate = bundle(r#"{"title":"Home","legacy":"Old"}"#);

        let report = CatalogAuditor::audit_bundle(Namespace::Common, &reference, &candidate);
        assert!(!report.has_errors());
        assert_eq!(report.warnings, vec!["Extra key: common.legacy"]);
    }

    #[test]
    fn test_placeholder_mismatch_is_warning() {
        let reference = bundle(r#"{"count":"{count} formations"}"#);
        let candidate = bundle(r#"{"count":"{total} courses"}"#);

        let report = CatalogAuditor::audit_bundle(Namespace::Courses, &reference, &candidate);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("courses.count"));
    }

    #[test]
    fn test_empty_translation_is_warning() {
        let reference = bundle(r#"{"title":"Catégories"}"#);
        let candidate = bundle(r#"{"title":"  "}"#);

        let report = CatalogAuditor::audit_bundle(Namespace::Categories, &reference, &candidate);
        assert_eq!(report.warnings, vec!["Empty translation: categories.title"]);
    }

    // ==================== Set Audit Tests ====================

    #[test]
    fn test_missing_namespace_is_error() {
        let mut reference = ResolvedMessageSet::new();
        reference.insert(Namespace::Auth, bundle(r#"{"login":"Connexion"}"#));
        reference.insert(Namespace::Common, bundle(r#"{"title":"Accueil"}"#));

        let mut candidate = ResolvedMessageSet::new();
        candidate.insert(Namespace::Common, bundle(r#"{"title":"Home"}"#));

        let report = CatalogAuditor::audit_sets(&reference, Locale::ENGLISH, &candidate);
        assert_eq!(
            report.errors,
            vec!["Missing namespace 'auth' for locale 'en'"]
        );
    }

    #[test]
    fn test_report_merge() {
        let mut report = AuditReport::new();
        report.merge(AuditReport {
            errors: vec!["e".to_string()],
            warnings: vec!["w".to_string()],
        });
        assert!(report.has_errors());
        assert!(report.has_warnings());
    }
}
