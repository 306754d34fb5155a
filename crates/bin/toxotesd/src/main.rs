//! # toxotesd — toxotes relay controller daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and set up logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Connect the MQTT publisher
//! - Construct the relay service, injecting adapters via port traits
//! - Build the axum router and serve until SIGINT/SIGTERM
//! - Disconnect from the broker and close the pool on the way out
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use toxotes_adapter_http_axum::router;
use toxotes_adapter_http_axum::state::AppState;
use toxotes_adapter_mqtt::MqttCommandPublisher;
use toxotes_adapter_storage_sqlite_sqlx::{Config as StorageConfig, SqliteThingRepository};
use toxotes_app::services::relay_service::RelayService;
use toxotes_app::status_board::InProcessStatusBoard;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let repo = SqliteThingRepository::new(db.pool().clone());

    // Broker
    let publisher = Arc::new(MqttCommandPublisher::connect(&config.mqtt));

    // Service
    let status_board = Arc::new(InProcessStatusBoard::new());
    let relay_service = RelayService::new(
        repo,
        Arc::clone(&publisher),
        Arc::clone(&status_board),
        config.node.clone(),
        config.mqtt.topics(),
    );

    // HTTP
    let state = AppState::new(Arc::new(relay_service), status_board);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "toxotesd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    publisher.shutdown().await;
    db.close().await;
    tracing::info!("toxotesd stopped");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
