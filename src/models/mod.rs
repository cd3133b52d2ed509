//! Data models for the M-Pesa integration.
//!
//! Nothing here is persisted. Every type lives for a single request.

/// OAuth access token issued by the provider
pub mod token;
/// B2C, C2B and URL registration payloads
pub mod payment;
/// Inbound webhook payloads and acknowledgements
pub mod callback;
