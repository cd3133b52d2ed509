//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `MPESA_CONSUMER_KEY` (required): Daraja app consumer key
/// - `MPESA_CONSUMER_SECRET` (required): Daraja app consumer secret
/// - `MPESA_SHORT_CODE` (required): Paybill / till number used as `PartyA` and `ShortCode`
/// - `MPESA_INITIATOR_NAME` (required): API operator username for B2C
/// - `MPESA_SECURITY_CREDENTIAL` (required): Encrypted initiator password for B2C
/// - `CALLBACK_BASE_URL` (required): Public base URL the provider calls back on
/// - `MPESA_BASE_URL` (optional): Daraja host, defaults to the sandbox
/// - `MPESA_RESPONSE_TYPE` (optional): Default C2B `ResponseType`, defaults to `Completed`
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `HTTP_TIMEOUT_SECS` (optional): Outbound request timeout, defaults to 30
#[derive(Clone, Deserialize)]
pub struct Config {
    pub mpesa_consumer_key: String,

    pub mpesa_consumer_secret: String,

    pub mpesa_short_code: String,

    pub mpesa_initiator_name: String,

    pub mpesa_security_credential: String,

    pub callback_base_url: Url,

    #[serde(default = "default_base_url")]
    pub mpesa_base_url: String,

    #[serde(default = "default_response_type")]
    pub mpesa_response_type: String,

    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,
}

/// Default Daraja host if MPESA_BASE_URL is not set.
fn default_base_url() -> String {
    "https://sandbox.safaricom.co.ke".to_string()
}

fn default_response_type() -> String {
    "Completed".to_string()
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing (e.g., MPESA_CONSUMER_KEY)
    /// - Environment variable values cannot be parsed into expected types
    ///   (e.g., CALLBACK_BASE_URL is not an absolute URL)
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: mpesa_short_code -> MPESA_SHORT_CODE
        envy::from_env::<Config>()
    }

    /// Absolute URL of a provider API path, e.g. `/oauth/v1/generate`.
    pub fn provider_url(&self, path: &str) -> String {
        join(&self.mpesa_base_url, path)
    }

    /// Absolute URL the provider should call back on for one of our webhook paths.
    pub fn callback_url(&self, path: &str) -> String {
        join(self.callback_base_url.as_str(), path)
    }
}

fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// Secrets must never end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("mpesa_consumer_key", &"<redacted>")
            .field("mpesa_consumer_secret", &"<redacted>")
            .field("mpesa_short_code", &self.mpesa_short_code)
            .field("mpesa_initiator_name", &self.mpesa_initiator_name)
            .field("mpesa_security_credential", &"<redacted>")
            .field("callback_base_url", &self.callback_base_url.as_str())
            .field("mpesa_base_url", &self.mpesa_base_url)
            .field("mpesa_response_type", &self.mpesa_response_type)
            .field("server_port", &self.server_port)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_config(mpesa_base_url: &str) -> Config {
    Config {
        mpesa_consumer_key: "consumer-key".to_string(),
        mpesa_consumer_secret: "consumer-secret".to_string(),
        mpesa_short_code: "600980".to_string(),
        mpesa_initiator_name: "testapi".to_string(),
        mpesa_security_credential: "encrypted-credential".to_string(),
        callback_base_url: Url::parse("https://gateway.example.com/mpesa/")
            .expect("static url is valid"),
        mpesa_base_url: mpesa_base_url.to_string(),
        mpesa_response_type: default_response_type(),
        server_port: default_port(),
        http_timeout_secs: 5,
    }
}
