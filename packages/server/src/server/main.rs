// Main entry point for the civic reports API server

use std::sync::Arc;

use anyhow::{Context, Result};
use civic_core::kernel::{create_messaging_gateway, LocalFileStore, ServerDeps};
use civic_core::server::{build_app, AppState};
use civic_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,civic_core=debug,sqlx=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Civic Reports API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        admins = config.admin_identifiers.len(),
        local_echo = config.uses_local_echo(),
        "Configuration loaded"
    );

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let deps = ServerDeps::from_config(
        &config,
        pool,
        create_messaging_gateway(&config),
        Arc::new(LocalFileStore::new(
            config.upload_dir.clone(),
            config.max_upload_bytes,
        )),
    );

    let app = build_app(AppState::new(
        deps,
        config.upload_dir.clone(),
        config.max_upload_bytes,
    ))?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
