use anyhow::Result;
use catalog_i18n::{config, server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("catalog_i18n=info".parse()?),
        )
        .init();

    info!("Starting catalogue message service");

    let config = config::Config::from_env()?;

    server::serve(&config).await
}
