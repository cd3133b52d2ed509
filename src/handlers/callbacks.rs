//! HTTP handlers for provider webhooks.
//!
//! - POST /validation - Accept or reject a pending C2B payment
//! - POST /confirmation - Completed C2B payment notification
//! - POST /cb - B2C result notification
//! - POST /timeout - B2C queue timeout notification
//!
//! None of these need an access token, and all of them answer 200 for any
//! body, so the provider never sees a failed delivery.

use axum::{Json, body::Bytes, extract::State};

use crate::models::callback::CallbackAck;
use crate::services::callback_service::{self, CallbackKind};
use crate::services::mpesa_client::MpesaClient;

/// Validation webhook.
///
/// # Response
///
/// ```json
/// { "ResultCode": "0", "ResultDesc": "Accepted" }
/// ```
///
/// or, for a rejected payment:
///
/// ```json
/// { "ResultCode": "C2B00013", "ResultDesc": "Rejected" }
/// ```
pub async fn validation(State(client): State<MpesaClient>, body: Bytes) -> Json<CallbackAck> {
    Json(callback_service::handle_validation(&body, client.config()))
}

pub async fn confirmation(body: Bytes) -> Json<CallbackAck> {
    Json(callback_service::handle_confirmation(&body))
}

/// B2C result webhook. Failed payments are acknowledged like successful ones.
pub async fn result(body: Bytes) -> Json<CallbackAck> {
    Json(callback_service::handle_result(CallbackKind::Result, &body))
}

pub async fn timeout(body: Bytes) -> Json<CallbackAck> {
    Json(callback_service::handle_result(CallbackKind::Timeout, &body))
}
