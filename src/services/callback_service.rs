//! Webhook handling for provider callbacks.
//!
//! The provider treats anything other than a prompt 2xx acknowledgement as a
//! failed delivery and redelivers. Nothing in here can fail: bodies that do not
//! parse are logged and acknowledged anyway.

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::models::callback::{C2bTransaction, CallbackAck, RejectReason, ResultNotification};

/// Which webhook delivered the payload, for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Validation,
    Confirmation,
    Result,
    Timeout,
}

impl CallbackKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CallbackKind::Validation => "validation",
            CallbackKind::Confirmation => "confirmation",
            CallbackKind::Result => "result",
            CallbackKind::Timeout => "timeout",
        }
    }
}

/// Longest prefix of an unparseable body that is written to the log.
const RAW_LOG_LIMIT: usize = 512;

fn raw_preview(body: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(&body[..body.len().min(RAW_LOG_LIMIT)])
}

/// Parse a raw body into a typed view, falling back to `None` on anything
/// that is not a JSON object of the expected shape.
fn parse<T: DeserializeOwned>(kind: CallbackKind, body: &[u8]) -> Option<T> {
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                callback = kind.as_str(),
                error = %e,
                raw = %raw_preview(body),
                len = body.len(),
                "Unparseable M-Pesa callback body, acknowledging anyway"
            );
            return None;
        }
    };

    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(
                callback = kind.as_str(),
                error = %e,
                payload = %value,
                "Unexpected M-Pesa callback shape, acknowledging anyway"
            );
            None
        }
    }
}

/// Decide whether to accept a C2B payment before the provider completes it.
///
/// # Rules
///
/// - `TransAmount` present but not a positive number → reject `C2B00013`
/// - `BusinessShortCode` present and not ours → reject `C2B00015`
/// - Anything else, including missing fields, is accepted
pub fn decide_validation(transaction: &C2bTransaction, config: &Config) -> CallbackAck {
    if let Some(ref amount) = transaction.trans_amount {
        let positive = amount
            .trim()
            .parse::<f64>()
            .is_ok_and(|a| a.is_finite() && a > 0.0);
        if !positive {
            return CallbackAck::rejected(RejectReason::InvalidAmount);
        }
    }

    if let Some(ref short_code) = transaction.business_short_code {
        if short_code.trim() != config.mpesa_short_code {
            return CallbackAck::rejected(RejectReason::InvalidShortcode);
        }
    }

    CallbackAck::accepted()
}

/// Handle a `/validation` delivery.
pub fn handle_validation(body: &[u8], config: &Config) -> CallbackAck {
    let Some(transaction) = parse::<C2bTransaction>(CallbackKind::Validation, body) else {
        return CallbackAck::accepted();
    };

    let ack = decide_validation(&transaction, config);
    tracing::info!(
        trans_id = ?transaction.trans_id,
        amount = ?transaction.trans_amount,
        msisdn = ?transaction.msisdn,
        accepted = ack.is_accepted(),
        result_code = %ack.result_code,
        "M-Pesa validation request"
    );
    ack
}

/// Handle a `/confirmation` delivery. Always accepted.
pub fn handle_confirmation(body: &[u8]) -> CallbackAck {
    if let Some(transaction) = parse::<C2bTransaction>(CallbackKind::Confirmation, body) {
        tracing::info!(
            trans_id = ?transaction.trans_id,
            trans_time = ?transaction.trans_time,
            transaction_type = ?transaction.transaction_type,
            amount = ?transaction.trans_amount,
            bill_ref_number = ?transaction.bill_ref_number,
            invoice_number = ?transaction.invoice_number,
            third_party_trans_id = ?transaction.third_party_trans_id,
            org_account_balance = ?transaction.org_account_balance,
            msisdn = ?transaction.msisdn,
            "M-Pesa payment confirmed"
        );
    }
    CallbackAck::accepted()
}

/// Handle a `/cb` (B2C result) or `/timeout` delivery. Always accepted, even
/// when the result reports a failed transaction.
pub fn handle_result(kind: CallbackKind, body: &[u8]) -> CallbackAck {
    if let Some(notification) = parse::<ResultNotification>(kind, body) {
        let result = notification.result;
        tracing::info!(
            callback = kind.as_str(),
            conversation_id = ?result.conversation_id,
            originator_conversation_id = ?result.originator_conversation_id,
            transaction_id = ?result.transaction_id,
            result_type = ?result.result_type,
            result_code = ?result.result_code,
            result_desc = ?result.result_desc,
            "M-Pesa B2C notification"
        );
    }
    CallbackAck::accepted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn validation_accepts_matching_payment() {
        let config = test_config("http://localhost");
        let ack = handle_validation(
            &body(json!({
                "TransID": "RKTQDM7W6S",
                "TransAmount": "10.00",
                "BusinessShortCode": "600980"
            })),
            &config,
        );
        assert!(ack.is_accepted());
    }

    #[test]
    fn validation_rejects_non_positive_amount() {
        let config = test_config("http://localhost");
        let ack = handle_validation(&body(json!({"TransAmount": "0"})), &config);
        assert_eq!(ack.result_code, "C2B00013");

        let ack = handle_validation(&body(json!({"TransAmount": "ten"})), &config);
        assert_eq!(ack.result_code, "C2B00013");
    }

    #[test]
    fn validation_rejects_foreign_short_code() {
        let config = test_config("http://localhost");
        let ack = handle_validation(
            &body(json!({"TransAmount": 10, "BusinessShortCode": 123456})),
            &config,
        );
        assert_eq!(ack.result_code, "C2B00015");
    }

    #[test]
    fn validation_accepts_payload_without_inspectable_fields() {
        let config = test_config("http://localhost");
        assert!(handle_validation(&body(json!({"anything": [1, 2, 3]})), &config).is_accepted());
        assert!(handle_validation(b"not json", &config).is_accepted());
    }

    #[test]
    fn raw_preview_is_bounded() {
        let huge = vec![b'x'; 4 * RAW_LOG_LIMIT];
        assert_eq!(raw_preview(&huge).len(), RAW_LOG_LIMIT);
        assert_eq!(raw_preview(b"short"), "short");
        assert!(handle_confirmation(&huge).is_accepted());
    }

    #[test]
    fn confirmation_and_results_always_acknowledge() {
        assert!(handle_confirmation(&body(json!({"TransID": "X"}))).is_accepted());
        assert!(handle_confirmation(&body(json!([1, 2]))).is_accepted());
        assert!(handle_confirmation(b"").is_accepted());

        let failed = body(json!({
            "Result": {"ResultCode": 2001, "ResultDesc": "The initiator information is invalid."}
        }));
        assert!(handle_result(CallbackKind::Result, &failed).is_accepted());
        assert!(handle_result(CallbackKind::Timeout, b"{}").is_accepted());
    }
}
