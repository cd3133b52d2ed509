//! M-Pesa Gateway - Main Application Entry Point
//!
//! This is an HTTP gateway in front of the Safaricom M-Pesa (Daraja) API. It initiates B2C payments, simulates C2B payments, registers C2B callback URLs, and receives the provider's validation, confirmation, result and timeout webhooks.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Provider Client**: reqwest, one fresh OAuth token per request
//! - **State**: None beyond immutable configuration
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build the M-Pesa HTTP client
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

mod config;
mod error;
mod handlers;
mod models;
mod router;
mod services;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::services::mpesa_client::MpesaClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        short_code = %config.mpesa_short_code,
        provider = %config.mpesa_base_url,
        callbacks = %config.callback_base_url,
        "Configuration loaded"
    );

    let port = config.server_port;
    let client = MpesaClient::new(Arc::new(config))?;

    let app = router::build_router(client);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, app).await?;

    Ok(())
}
