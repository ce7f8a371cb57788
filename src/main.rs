//! tasktalk - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the todo and chat API.

use tasktalk::{api, config::Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tasktalk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Loaded configuration: store={}, database={}, fallback_model={}",
        config.store.as_str(),
        config.database_path.display(),
        config.fallback.model
    );

    api::serve(config).await
}
