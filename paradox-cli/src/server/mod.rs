pub mod config;
mod error;
pub mod metrics;
mod routes;
pub mod state;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::info;

use self::config::{PdServerConfig, StorageBackend};
use self::metrics::{handle_metrics, track_metrics};
use self::routes::{
    handle_active_items, handle_all_items, handle_create_item, handle_delete_item,
    handle_delete_subscriber, handle_get_item, handle_health, handle_login, handle_subscribe,
    handle_subscribers, handle_update_item,
};
use self::state::{open_store, AppState};

/// Command-line values for `paradox serve`. Each one, when given, wins over
/// the environment and the config file.
#[derive(Debug, Default)]
pub struct ServeArgs {
    pub config_path: String,
    pub data_file: Option<String>,
    pub port: Option<u16>,
    pub hostname: Option<String>,
    pub storage: Option<StorageBackend>,
}

/// Build the HTTP router over `state`. API routes live under `/api`.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handle_health))
        .route("/items", get(handle_active_items).post(handle_create_item))
        .route("/items/all", get(handle_all_items))
        .route(
            "/items/{id}",
            get(handle_get_item)
                .put(handle_update_item)
                .delete(handle_delete_item),
        )
        .route("/subscribers", get(handle_subscribers))
        .route(
            "/subscribers/{id}",
            axum::routing::delete(handle_delete_subscriber),
        )
        .route("/subscribe", post(handle_subscribe))
        .route("/login", post(handle_login));

    Router::new()
        .nest("/api", api)
        .route("/metrics", get(handle_metrics))
        .layer(middleware::from_fn(track_metrics))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    // CLI args override env vars, which override the config file
    let mut config = PdServerConfig::load(&args.config_path);
    config.apply_env_overrides();
    if let Some(data_file) = args.data_file {
        config.server.data_file = data_file;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(hostname) = args.hostname {
        config.server.hostname = hostname;
    }
    if let Some(storage) = args.storage {
        config.server.storage = storage;
    }

    let store = open_store(&config.server).map_err(|e| anyhow!(e))?;
    let location = match config.server.storage {
        StorageBackend::File => config.server.data_file.clone(),
        StorageBackend::Sled => config.server.data_dir.clone(),
        StorageBackend::Memory => "memory".to_string(),
    };
    // Touch the store once so a missing or corrupt dataset is repaired at startup.
    let snapshot = store.load().await;
    info!(
        "Loaded {} items and {} subscribers from {} ({})",
        snapshot.items.len(),
        snapshot.subscribers.len(),
        location,
        store.backend()
    );
    if config.admin.is_some() {
        info!("Admin credential supplied by configuration");
    }

    let state = Arc::new(AppState::new(store, config.admin.as_ref()));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.hostname, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    info!("Paradox API listening on http://{}/api", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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

    info!("Shutdown signal received, finishing in-flight requests...");
}
