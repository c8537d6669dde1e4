//! Web server and API endpoints for the AirIQ dashboard.
//!
//! This module provides the dashboard's read interfaces over the monitor:
//! REST endpoints for the current reading, per-metric history, and the
//! metric list, plus WebSocket streaming of each new reading.

pub mod config;
pub mod handlers;
pub mod router;
pub mod websocket;

// Re-export commonly used items
pub use config::WebConfig;
pub use handlers::AppState;
pub use router::create_app;

use crate::error::{MonitorError, Result};
use std::net::SocketAddr;
use tracing::info;

/// Start the web server with the provided configuration and shared state.
///
/// The sampling loop runs elsewhere; this server only exposes its results.
pub async fn start_web_server(config: WebConfig, state: AppState) -> Result<()> {
    let app = create_app(config.clone(), state).await?;

    let addr = config
        .bind_address()
        .parse::<SocketAddr>()
        .map_err(|e| MonitorError::config_error(format!("Invalid bind address: {}", e)))?;

    info!("Starting AirIQ web server on http://{}", addr);
    info!("Dashboard available at http://{}/", addr);
    info!("API endpoint: http://{}/api/current", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MonitorError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| MonitorError::web_server_error(format!("Server error: {}", e)))?;

    Ok(())
}

/// Start a web server with simple port-only configuration.
///
/// This is a convenience function for the common use case of just
/// specifying a port.
pub async fn start_web_server_simple(port: u16, state: AppState) -> Result<()> {
    let config = WebConfig::default().with_port(port);
    start_web_server(config, state).await
}
