//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body)
//! 2. Calls the M-Pesa client or the callback service
//! 3. Returns HTTP response (JSON, status code)

/// Provider webhooks: validation, confirmation, result, timeout
pub mod callbacks;
/// Liveness check
pub mod health;
/// Provider-initiated operations: B2C, C2B, URL registration
pub mod payments;
