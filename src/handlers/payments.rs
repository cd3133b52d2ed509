//! Provider-initiated operation handlers.
//!
//! This module implements the endpoints that call out to M-Pesa:
//! - POST /b2c - Pay a customer from the business short code
//! - POST /c2b - Simulate a customer paying the business short code
//! - POST /register-url - Register C2B validation/confirmation URLs
//!
//! Each request validates its input, acquires its own access token, then
//! makes exactly one provider call with it. If token acquisition fails the
//! provider call is never attempted.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::Value;

use crate::{
    error::AppError,
    models::payment::{B2cRequest, C2bRequest, RegisterUrlRequest},
    services::mpesa_client::MpesaClient,
};

/// Send a B2C payment.
///
/// # Request Body
///
/// ```json
/// {
///   "amount": 100,
///   "recipient": "254708374149",
///   "command_id": "BusinessPayment",
///   "remarks": "Refund",
///   "occasion": "Order 42"
/// }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: The provider's acknowledgement, relayed as-is
/// - **Error (400)**: Invalid request body
/// - **Error (502/504 or provider status)**: Token or payment call failed
///
/// ```json
/// {
///   "ConversationID": "AG_20191219_00005797af5d7d75f652",
///   "OriginatorConversationID": "16740-34861180-1",
///   "ResponseCode": "0",
///   "ResponseDescription": "Accept the service request successfully."
/// }
/// ```
///
/// The final outcome arrives later on `/cb` (or `/timeout`).
pub async fn b2c(
    State(client): State<MpesaClient>,
    payload: Result<Json<B2cRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let payment = request.into_payload(client.config())?;

    let token = client.fetch_access_token().await?;
    let response = client.b2c_payment(&token, &payment).await?;

    tracing::info!(
        originator_conversation_id = %payment.originator_conversation_id,
        conversation_id = ?response.get("ConversationID"),
        "B2C payment submitted"
    );
    Ok(Json(response))
}

/// Simulate a C2B payment.
///
/// # Request Body
///
/// ```json
/// {
///   "amount": 10,
///   "msisdn": "254708374149",
///   "bill_ref_number": "INV-001",
///   "command_id": "CustomerPayBillOnline"
/// }
/// ```
///
/// On success the provider later calls `/validation` (if enabled for the
/// short code) and `/confirmation`.
pub async fn c2b(
    State(client): State<MpesaClient>,
    payload: Result<Json<C2bRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let simulation = request.into_payload(client.config())?;

    let token = client.fetch_access_token().await?;
    let response = client.c2b_simulate(&token, &simulation).await?;

    tracing::info!(
        bill_ref_number = %simulation.bill_ref_number,
        "C2B payment simulated"
    );
    Ok(Json(response))
}

/// Register C2B callback URLs.
///
/// # Request Body
///
/// All fields optional; send `{}` to register the configured defaults.
///
/// ```json
/// {
///   "response_type": "Completed",
///   "confirmation_url": "https://example.com/confirmation",
///   "validation_url": "https://example.com/validation"
/// }
/// ```
///
/// `response_type` decides what the provider does when `/validation` cannot be
/// reached: `Completed` completes the payment, `Cancelled` cancels it.
pub async fn register_url(
    State(client): State<MpesaClient>,
    payload: Result<Json<RegisterUrlRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(request) = payload?;
    let registration = request.into_payload(client.config())?;

    let token = client.fetch_access_token().await?;
    let response = client.register_urls(&token, &registration).await?;

    tracing::info!(
        confirmation_url = %registration.confirmation_url,
        validation_url = %registration.validation_url,
        "C2B URLs registered"
    );
    Ok(Json(response))
}
