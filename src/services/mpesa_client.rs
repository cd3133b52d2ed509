//! M-Pesa (Daraja) API client.
//!
//! This client handles:
//! - OAuth token acquisition with the consumer key/secret
//! - B2C payment requests
//! - C2B simulation and URL registration
//!
//! # Statelessness
//!
//! The client holds only immutable configuration and a `reqwest::Client`
//! connection pool. Tokens are returned to the caller and never stored, so
//! every request acquires and uses its own.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::AppError;
use crate::models::payment::{B2cPaymentRequest, C2bSimulateRequest, RegisterUrlPayload};
use crate::models::token::{AccessToken, TokenResponse};

pub const TOKEN_PATH: &str = "/oauth/v1/generate";
pub const B2C_PATH: &str = "/mpesa/b2c/v3/paymentrequest";
pub const C2B_SIMULATE_PATH: &str = "/mpesa/c2b/v1/simulate";
pub const C2B_REGISTER_PATH: &str = "/mpesa/c2b/v1/registerurl";

#[derive(Clone)]
pub struct MpesaClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl MpesaClient {
    /// Build a client whose requests time out after `HTTP_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(config: Arc<Config>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Obtain a fresh access token.
    ///
    /// # Request
    ///
    /// `GET /oauth/v1/generate?grant_type=client_credentials` with HTTP Basic
    /// auth built from the consumer key and secret.
    ///
    /// # Errors
    ///
    /// - `UpstreamAuth`: Provider rejected the credentials (any non-2xx)
    /// - `Network`: Provider unreachable or timed out
    /// - `MalformedResponse`: 2xx body without a usable `access_token`
    pub async fn fetch_access_token(&self) -> Result<AccessToken, AppError> {
        let response = self
            .http
            .get(self.config.provider_url(TOKEN_PATH))
            .query(&[("grant_type", "client_credentials")])
            .basic_auth(
                &self.config.mpesa_consumer_key,
                Some(&self.config.mpesa_consumer_secret),
            )
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| body.get("errorMessage")?.as_str().map(str::to_string))
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "token request rejected".to_string());
            tracing::warn!(status = status.as_u16(), %message, "M-Pesa token request rejected");
            return Err(AppError::UpstreamAuth {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::MalformedResponse(format!("token response: {e}")))?;
        if token.access_token.trim().is_empty() {
            return Err(AppError::MalformedResponse(
                "token response: empty access_token".to_string(),
            ));
        }
        let token = AccessToken::from(token);
        tracing::debug!(expires_at = %token.expires_at, "M-Pesa access token acquired");

        Ok(token)
    }

    /// Submit a B2C disbursement. Returns the provider's acknowledgement
    /// (`ConversationID`, `OriginatorConversationID`, `ResponseCode`, ...).
    pub async fn b2c_payment(
        &self,
        token: &AccessToken,
        payload: &B2cPaymentRequest,
    ) -> Result<Value, AppError> {
        self.post(B2C_PATH, token, payload).await
    }

    /// Simulate a C2B payment into the configured short code.
    pub async fn c2b_simulate(
        &self,
        token: &AccessToken,
        payload: &C2bSimulateRequest,
    ) -> Result<Value, AppError> {
        self.post(C2B_SIMULATE_PATH, token, payload).await
    }

    /// Register where the provider sends C2B validation and confirmation webhooks.
    pub async fn register_urls(
        &self,
        token: &AccessToken,
        payload: &RegisterUrlPayload,
    ) -> Result<Value, AppError> {
        self.post(C2B_REGISTER_PATH, token, payload).await
    }

    /// POST a JSON payload with the bearer token and relay the JSON answer.
    ///
    /// Non-2xx answers become `UpstreamRequest`, carrying the provider's body
    /// when it is JSON.
    async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        token: &AccessToken,
        payload: &T,
    ) -> Result<Value, AppError> {
        let response = self
            .http
            .post(self.config.provider_url(path))
            .bearer_auth(token.bearer())
            .json(payload)
            .send()
            .await
            .inspect_err(|e| tracing::error!(path, error = %e, "M-Pesa request failed"))?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).ok();
            tracing::error!(path, status = status.as_u16(), ?body, "M-Pesa rejected request");
            return Err(AppError::UpstreamRequest {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| AppError::MalformedResponse(format!("{path} response: {e}")))
    }
}
