// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dashboard_migrator::application::migrator::MigratorHandle;
use dashboard_migrator::application::schema_registry::{StaticRegistry, LATEST_VERSION};
use dashboard_migrator::infrastructure::config::load_migrator_config;
use dashboard_migrator::infrastructure::static_providers::{ConfiguredDataSources, ConfiguredPanelPlugins};
use dashboard_migrator::presentation::app_state::AppState;
use dashboard_migrator::presentation::handlers::{
    health_check, migrate_dashboard, normalize_dashboard, save_model,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_migrator_config()?;

    // Registry of per-version transforms; versions without one are no-op steps
    let registry = Arc::new(StaticRegistry::new(config.migration.min_version, LATEST_VERSION));
    let migrator = Arc::new(MigratorHandle::new(registry));
    migrator
        .initialize(
            Arc::new(ConfiguredDataSources::new(config.datasources)),
            Arc::new(ConfiguredPanelPlugins::new(config.panel_plugins)),
        )
        .await;

    let state = Arc::new(AppState {
        migrator,
        default_target_version: config.migration.target_version,
    });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboards/migrate", post(migrate_dashboard))
        .route("/dashboards/normalize", post(normalize_dashboard))
        .route("/dashboards/save-model", post(save_model))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting dashboard-migrator on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
