//! Webhook models for provider callbacks.
//!
//! The provider POSTs to `/validation`, `/confirmation`, `/cb` and `/timeout`.
//! Payloads are opaque to the gateway: the typed views below exist only so the
//! interesting fields can be logged. Every field is optional and unknown fields
//! are ignored, so any JSON object parses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// C2B transaction notification (validation and confirmation).
///
/// # Example
///
/// ```json
/// {
///   "TransactionType": "Pay Bill",
///   "TransID": "RKTQDM7W6S",
///   "TransTime": "20191122063845",
///   "TransAmount": "10",
///   "BusinessShortCode": "600638",
///   "BillRefNumber": "254708374149",
///   "MSISDN": "25470****149",
///   "FirstName": "John"
/// }
/// ```
///
/// Only the fields the gateway logs or inspects are kept. Customer names are
/// left out so they never reach the log.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct C2bTransaction {
    #[serde(deserialize_with = "lenient_string")]
    pub transaction_type: Option<String>,
    #[serde(rename = "TransID", deserialize_with = "lenient_string")]
    pub trans_id: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub trans_time: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub trans_amount: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub business_short_code: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub bill_ref_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub invoice_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub org_account_balance: Option<String>,
    #[serde(rename = "ThirdPartyTransID", deserialize_with = "lenient_string")]
    pub third_party_trans_id: Option<String>,
    #[serde(rename = "MSISDN", deserialize_with = "lenient_string")]
    pub msisdn: Option<String>,
}

/// Sandbox sends some numeric fields as numbers, production as strings.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// B2C result or queue-timeout notification.
///
/// ```json
/// {
///   "Result": {
///     "ResultType": 0,
///     "ResultCode": 0,
///     "ResultDesc": "The service request is processed successfully.",
///     "OriginatorConversationID": "10571-7910404-1",
///     "ConversationID": "AG_20191219_00004e48cf7e3533f581",
///     "TransactionID": "NLJ41HAY6Q"
///   }
/// }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ResultNotification {
    pub result: ResultBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ResultBody {
    pub result_type: Option<Value>,
    pub result_code: Option<Value>,
    pub result_desc: Option<String>,
    #[serde(rename = "OriginatorConversationID")]
    pub originator_conversation_id: Option<String>,
    #[serde(rename = "ConversationID")]
    pub conversation_id: Option<String>,
    #[serde(rename = "TransactionID")]
    pub transaction_id: Option<String>,
}

/// Acknowledgement returned to the provider.
///
/// `"ResultCode": "0"` means accepted. Validation may instead answer with one
/// of Daraja's `C2B000xx` rejection codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackAck {
    pub result_code: String,
    pub result_desc: String,
}

impl CallbackAck {
    pub fn accepted() -> Self {
        Self {
            result_code: "0".to_string(),
            result_desc: "Accepted".to_string(),
        }
    }

    pub fn rejected(reason: RejectReason) -> Self {
        Self {
            result_code: reason.code().to_string(),
            result_desc: "Rejected".to_string(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.result_code == "0"
    }
}

/// Daraja C2B validation rejection codes the gateway can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    InvalidAmount,
    InvalidShortcode,
}

impl RejectReason {
    pub fn code(self) -> &'static str {
        match self {
            RejectReason::InvalidAmount => "C2B00013",
            RejectReason::InvalidShortcode => "C2B00015",
        }
    }
}
