//! Audit every locale's message bundles against the source locale.
//!
//! Usage:
//!   cargo run --bin audit
//!   cargo run --bin audit -- --strict   # warnings also fail the run
//!
//! Reads bundles from MESSAGES_DIR (or MESSAGES_BASE_URL) like the service.

use anyhow::Result;
use catalog_i18n::config::Config;
use catalog_i18n::i18n::{AuditReport, CatalogAuditor, Locale, NamespaceLoader};
use catalog_i18n::server::build_source;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_i18n=info".parse()?),
        )
        .init();

    let strict = std::env::args().any(|arg| arg == "--strict");

    let config = Config::from_env()?;
    let loader = NamespaceLoader::new(build_source(&config)?);

    let source_locale = Locale::source();
    let reference = loader.load(source_locale).await;
    info!(
        "Reference locale '{}' has {} namespaces",
        source_locale,
        reference.loaded_namespaces().len()
    );
    for namespace in reference.missing_namespaces() {
        warn!("Source locale is missing namespace '{}'", namespace);
    }

    let mut total = AuditReport::new();
    for locale in Locale::all().into_iter().filter(|l| *l != source_locale) {
        let candidate = loader.load(locale).await;
        let report = CatalogAuditor::audit_sets(&reference, locale, &candidate);

        println!("\n=== {} ({}) ===", locale.native_name(), locale);
        if report.is_clean() {
            println!("OK");
        }
        for error in &report.errors {
            println!("ERROR   {}", error);
        }
        for warning in &report.warnings {
            println!("WARNING {}", warning);
        }

        total.merge(report);
    }

    println!(
        "\n{} errors, {} warnings",
        total.errors.len(),
        total.warnings.len()
    );

    if total.has_errors() || (strict && total.has_warnings()) {
        std::process::exit(1);
    }
    Ok(())
}
