//! HTTP route table.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::services::mpesa_client::MpesaClient;

/// Build the application router.
///
/// The M-Pesa client is the only shared state. It is immutable, so concurrent
/// requests share nothing they could race on.
pub fn build_router(client: MpesaClient) -> Router {
    Router::new()
        // Public routes
        .route("/health", get(handlers::health::health_check))
        // Provider-initiated operations (token → provider call)
        .route("/b2c", post(handlers::payments::b2c))
        .route("/c2b", post(handlers::payments::c2b))
        .route("/register-url", post(handlers::payments::register_url))
        // Provider webhooks
        .route("/validation", post(handlers::callbacks::validation))
        .route("/confirmation", post(handlers::callbacks::confirmation))
        .route("/cb", post(handlers::callbacks::result))
        .route("/timeout", post(handlers::callbacks::timeout))
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        .with_state(client)
}
