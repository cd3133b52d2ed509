//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

/// Application-wide error type.
///
/// Every variant is surfaced to the HTTP caller as-is. Nothing here is
/// retried or recovered internally.
///
/// # Error Categories
///
/// - **Upstream Auth Errors**: The token endpoint rejected our credentials
/// - **Upstream Request Errors**: The provider rejected a payment or registration call
/// - **Network Errors**: The provider could not be reached
/// - **Malformed Responses**: The provider answered 2xx with a body we cannot read
/// - **Validation Errors**: Invalid request data from the caller
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Token endpoint returned a non-success status.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("M-Pesa token request failed with status {status}: {message}")]
    UpstreamAuth { status: u16, message: String },

    /// Transaction or registration endpoint returned a non-success status.
    ///
    /// Relays the provider's status when it is a 4xx/5xx, together with its body.
    #[error("M-Pesa request failed with status {status}")]
    UpstreamRequest { status: u16, body: Option<Value> },

    /// Transport-level failure (DNS, connect, TLS, timeout).
    ///
    /// Returns HTTP 504 on timeout, 502 otherwise.
    #[error("M-Pesa API unreachable: {0}")]
    Network(#[from] reqwest::Error),

    /// Provider answered successfully but the body was not what we expected.
    ///
    /// Returns HTTP 502 Bad Gateway.
    #[error("Malformed M-Pesa response: {0}")]
    MalformedResponse(String),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Pull Daraja's `errorMessage` out of an error body, if there is one.
fn provider_message(body: &Option<Value>) -> Option<String> {
    body.as_ref()?
        .get("errorMessage")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message",
///     "provider": { "errorCode": "400.002.02", "errorMessage": "..." }
///   }
/// }
/// ```
///
/// `provider` is only present when the M-Pesa API returned a JSON body.
///
/// # Status Code Mapping
///
/// - `UpstreamAuth` → 502 Bad Gateway
/// - `UpstreamRequest` → provider's 4xx/5xx status, otherwise 502
/// - `Network` → 504 Gateway Timeout on timeout, otherwise 502
/// - `MalformedResponse` → 502 Bad Gateway
/// - `InvalidRequest` → 400 Bad Request
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, provider) = match self {
            AppError::UpstreamAuth { ref message, .. } => (
                StatusCode::BAD_GATEWAY,
                "upstream_auth_failed",
                format!("Could not obtain M-Pesa access token: {message}"),
                None,
            ),
            AppError::UpstreamRequest { status, body } => {
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                let message = provider_message(&body)
                    .unwrap_or_else(|| "M-Pesa rejected the request".to_string());
                (status, "upstream_request_failed", message, body)
            }
            AppError::Network(ref err) => {
                let status = if err.is_timeout() {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                };
                (
                    status,
                    "upstream_unreachable",
                    "M-Pesa API is unreachable".to_string(),
                    None,
                )
            }
            AppError::MalformedResponse(ref msg) => (
                StatusCode::BAD_GATEWAY,
                "malformed_upstream_response",
                msg.clone(),
                None,
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone(), None)
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(provider) = provider {
            error["provider"] = provider;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
