//! Business logic services.
//!
//! Services hold the provider integration and the webhook decision logic,
//! separated from HTTP handlers.

pub mod callback_service;
pub mod mpesa_client;
