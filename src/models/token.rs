//! Access token model.
//!
//! Daraja issues bearer tokens from `GET /oauth/v1/generate`. A token is
//! fetched at the start of every provider-initiated request and dropped when
//! that request completes.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};

/// Raw body returned by the token endpoint.
///
/// ```json
/// {
///   "access_token": "c9SQxWWhmdVRlyh0zh8gZDTkubVF",
///   "expires_in": "3599"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Lifetime in seconds. Daraja sends it as a string, but numbers are accepted too.
    #[serde(deserialize_with = "seconds_from_string_or_number")]
    pub expires_in: u64,
}

fn seconds_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Bearer credential used to authorize exactly one provider call.
#[derive(Clone)]
pub struct AccessToken {
    token: String,

    /// Expiry as reported by the provider, converted to an absolute instant.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn bearer(&self) -> &str {
        &self.token
    }
}

impl From<TokenResponse> for AccessToken {
    fn from(response: TokenResponse) -> Self {
        // Clamped so the addition below cannot overflow.
        let lifetime = response.expires_in.min(u64::from(u32::MAX)) as i64;
        Self {
            token: response.access_token,
            expires_at: Utc::now() + Duration::seconds(lifetime),
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
