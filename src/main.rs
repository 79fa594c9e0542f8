use anyhow::Result;
use bookstore_i18n::config::Config;
use bookstore_i18n::server::{self, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bookstore_i18n=info".parse()?),
        )
        .init();

    info!("Starting bookstore translation service");

    let config = Config::from_env()?;
    info!(
        locale_root = %config.locale_root.display(),
        provider = %config.translate_api_url,
        cache_capacity = config.cache_capacity,
        "Loaded configuration"
    );

    let state = AppState::new(config)?;
    server::serve(state).await?;

    info!("Server stopped");
    Ok(())
}
