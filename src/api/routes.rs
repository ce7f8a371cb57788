//! Router, shared state and server lifecycle.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::assistant::Assistant;
use crate::config::Config;

use super::chat;
use super::task_store::{create_task_store, TaskStore};
use super::todos as todos_api;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Backing store for todos
    pub store: Arc<dyn TaskStore>,
    /// Natural-language interpreter used by the chat endpoint
    pub assistant: Assistant,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn TaskStore>) -> Self {
        let assistant = Assistant::from_config(&config.fallback);
        Self {
            config,
            store,
            assistant,
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/chat", post(chat::chat))
        .nest("/api/todos", todos_api::routes())
        // The browser front-end is served from another origin.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn TaskStore> =
        Arc::from(create_task_store(config.store, config.database_path.clone()).await?);
    tracing::info!(
        store = config.store.as_str(),
        persistent = store.is_persistent(),
        "Task store ready"
    );

    let state = Arc::new(AppState::new(config.clone(), store));
    if state.assistant.fallback_enabled() {
        tracing::info!(model = %config.fallback.model, "Remote fallback enabled");
    } else {
        tracing::info!("Remote fallback disabled (no OPENROUTER_API_KEY)");
    }

    let app = router(Arc::clone(&state));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Setup graceful shutdown on SIGTERM/SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: state.config.store.as_str().to_string(),
        fallback_enabled: state.assistant.fallback_enabled(),
    })
}

/// In-memory state with the fallback disabled.
#[cfg(test)]
pub(crate) fn test_state() -> Arc<AppState> {
    use super::task_store::InMemoryTaskStore;
    Arc::new(AppState::new(Config::new(), Arc::new(InMemoryTaskStore::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let Json(health) = health(State(test_state())).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.store, "memory");
        assert!(!health.fallback_enabled);
    }

    #[test]
    fn test_router_builds() {
        let _app = router(test_state());
    }
}
