//! drill-server - REST API server binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use drill_server::{create_server, factory, AppState};
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
                .add_directive("drill_server=debug".parse()?),
        )
        .init();

    // Get configuration from environment
    let host = std::env::var("DRILL_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("DRILL_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()?;
    let config_path = std::env::var("DRILL_CONFIG").ok().map(PathBuf::from);
    let catalog_path = std::env::var("DRILL_CATALOG").ok().map(PathBuf::from);
    let api_key = std::env::var("DRILL_API_KEY").ok();

    let config = factory::load_config(config_path.as_deref())?;
    let store = factory::load_store(catalog_path.as_deref())?;
    info!(drills = store.drill_count().await, "Catalog loaded");

    let engine = factory::create_engine(&config, store.clone())?;
    let state = AppState::new(engine, store).with_api_key(api_key);
    if state.api_key().is_some() {
        info!("Authentication enabled");
    } else {
        info!("Authentication disabled");
    }

    let app = create_server(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting drill-server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server stopped cleanly");
    Ok(())
}
