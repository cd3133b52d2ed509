//! Payment request models.
//!
//! This module defines:
//! - Caller-facing request bodies for `/b2c`, `/c2b` and `/register-url`
//! - The Daraja payloads built from them (PascalCase field names on the wire)

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;

/// B2C command types accepted by Daraja.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum B2cCommand {
    #[default]
    BusinessPayment,
    SalaryPayment,
    PromotionPayment,
}

/// C2B command types accepted by Daraja.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum C2bCommand {
    /// Paybill
    #[default]
    CustomerPayBillOnline,
    /// Till number
    CustomerBuyGoodsOnline,
}

/// Request to send money from the business short code to a customer.
///
/// # JSON Example
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
#[derive(Debug, Deserialize)]
pub struct B2cRequest {
    /// Whole shillings; Daraja does not accept fractional amounts
    pub amount: u64,

    /// Recipient MSISDN, e.g. `2547XXXXXXXX`
    pub recipient: String,

    #[serde(default)]
    pub command_id: B2cCommand,

    pub remarks: Option<String>,

    pub occasion: Option<String>,
}

/// Request to simulate a customer paying the business short code.
///
/// # JSON Example
///
/// ```json
/// {
///   "amount": 10,
///   "msisdn": "254708374149",
///   "bill_ref_number": "INV-001"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct C2bRequest {
    pub amount: u64,

    /// Paying customer's MSISDN
    pub msisdn: String,

    pub bill_ref_number: Option<String>,

    #[serde(default)]
    pub command_id: C2bCommand,
}

/// Request to register validation/confirmation URLs.
///
/// Every field is optional; missing ones fall back to configuration.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterUrlRequest {
    pub response_type: Option<String>,
    pub confirmation_url: Option<String>,
    pub validation_url: Option<String>,
}

/// `POST /mpesa/b2c/v3/paymentrequest` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct B2cPaymentRequest {
    #[serde(rename = "OriginatorConversationID")]
    pub originator_conversation_id: String,
    pub initiator_name: String,
    pub security_credential: String,
    #[serde(rename = "CommandID")]
    pub command_id: B2cCommand,
    pub amount: u64,
    pub party_a: String,
    pub party_b: String,
    pub remarks: String,
    #[serde(rename = "QueueTimeOutURL")]
    pub queue_time_out_url: String,
    #[serde(rename = "ResultURL")]
    pub result_url: String,
    pub occasion: String,
}

/// `POST /mpesa/c2b/v1/simulate` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct C2bSimulateRequest {
    pub short_code: String,
    #[serde(rename = "CommandID")]
    pub command_id: C2bCommand,
    pub amount: u64,
    pub msisdn: String,
    pub bill_ref_number: String,
}

/// `POST /mpesa/c2b/v1/registerurl` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterUrlPayload {
    pub short_code: String,
    pub response_type: String,
    #[serde(rename = "ConfirmationURL")]
    pub confirmation_url: String,
    #[serde(rename = "ValidationURL")]
    pub validation_url: String,
}

fn validate_amount(amount: u64) -> Result<(), AppError> {
    if amount == 0 {
        return Err(AppError::InvalidRequest(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(())
}

/// MSISDNs are 9 to 15 digits, no `+` prefix.
fn validate_msisdn(field: &str, value: &str) -> Result<(), AppError> {
    let valid = (9..=15).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit());
    if !valid {
        return Err(AppError::InvalidRequest(format!(
            "{field} must be a phone number of 9 to 15 digits"
        )));
    }
    Ok(())
}

impl B2cRequest {
    /// Validate the caller's input and build the Daraja payload.
    pub fn into_payload(self, config: &Config) -> Result<B2cPaymentRequest, AppError> {
        validate_amount(self.amount)?;
        validate_msisdn("recipient", &self.recipient)?;

        Ok(B2cPaymentRequest {
            originator_conversation_id: Uuid::new_v4().to_string(),
            initiator_name: config.mpesa_initiator_name.clone(),
            security_credential: config.mpesa_security_credential.clone(),
            command_id: self.command_id,
            amount: self.amount,
            party_a: config.mpesa_short_code.clone(),
            party_b: self.recipient,
            remarks: self.remarks.unwrap_or_else(|| "B2C payment".to_string()),
            queue_time_out_url: config.callback_url("timeout"),
            result_url: config.callback_url("cb"),
            occasion: self.occasion.unwrap_or_default(),
        })
    }
}

impl C2bRequest {
    /// Validate the caller's input and build the Daraja payload.
    pub fn into_payload(self, config: &Config) -> Result<C2bSimulateRequest, AppError> {
        validate_amount(self.amount)?;
        validate_msisdn("msisdn", &self.msisdn)?;

        Ok(C2bSimulateRequest {
            short_code: config.mpesa_short_code.clone(),
            command_id: self.command_id,
            amount: self.amount,
            msisdn: self.msisdn,
            bill_ref_number: self.bill_ref_number.unwrap_or_else(|| "account".to_string()),
        })
    }
}

impl RegisterUrlRequest {
    /// Fill in configured defaults and build the Daraja payload.
    pub fn into_payload(self, config: &Config) -> Result<RegisterUrlPayload, AppError> {
        let response_type = self
            .response_type
            .unwrap_or_else(|| config.mpesa_response_type.clone());
        if response_type != "Completed" && response_type != "Cancelled" {
            return Err(AppError::InvalidRequest(
                "response_type must be Completed or Cancelled".to_string(),
            ));
        }

        let confirmation_url = self
            .confirmation_url
            .unwrap_or_else(|| config.callback_url("confirmation"));
        let validation_url = self
            .validation_url
            .unwrap_or_else(|| config.callback_url("validation"));
        for candidate in [&confirmation_url, &validation_url] {
            let parsed = url::Url::parse(candidate).map_err(|_| {
                AppError::InvalidRequest(format!("Invalid callback URL: {candidate}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(AppError::InvalidRequest(format!(
                    "Callback URL must use HTTP or HTTPS: {candidate}"
                )));
            }
        }

        Ok(RegisterUrlPayload {
            short_code: config.mpesa_short_code.clone(),
            response_type,
            confirmation_url,
            validation_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn b2c_payload_uses_daraja_field_names() {
        let config = test_config("http://localhost");
        let request: B2cRequest =
            serde_json::from_str(r#"{"amount":100,"recipient":"254708374149"}"#).unwrap();
        let payload = serde_json::to_value(request.into_payload(&config).unwrap()).unwrap();

        assert_eq!(payload["CommandID"], "BusinessPayment");
        assert_eq!(payload["Amount"], 100);
        assert_eq!(payload["PartyA"], "600980");
        assert_eq!(payload["PartyB"], "254708374149");
        assert_eq!(payload["InitiatorName"], "testapi");
        assert_eq!(
            payload["ResultURL"],
            "https://gateway.example.com/mpesa/cb"
        );
        assert_eq!(
            payload["QueueTimeOutURL"],
            "https://gateway.example.com/mpesa/timeout"
        );
        assert!(
            payload["OriginatorConversationID"]
                .as_str()
                .is_some_and(|id| Uuid::parse_str(id).is_ok())
        );
    }

    #[test]
    fn b2c_rejects_zero_amount_and_bad_recipient() {
        let config = test_config("http://localhost");

        let zero = B2cRequest {
            amount: 0,
            recipient: "254708374149".to_string(),
            command_id: B2cCommand::default(),
            remarks: None,
            occasion: None,
        };
        assert!(matches!(
            zero.into_payload(&config),
            Err(AppError::InvalidRequest(_))
        ));

        let bad_phone = B2cRequest {
            amount: 10,
            recipient: "+2547-08".to_string(),
            command_id: B2cCommand::SalaryPayment,
            remarks: None,
            occasion: None,
        };
        assert!(matches!(
            bad_phone.into_payload(&config),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn unknown_command_is_rejected_by_deserialization() {
        let parsed = serde_json::from_str::<B2cRequest>(
            r#"{"amount":1,"recipient":"254708374149","command_id":"Withdraw"}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn c2b_defaults_to_paybill() {
        let config = test_config("http://localhost");
        let request: C2bRequest =
            serde_json::from_str(r#"{"amount":5,"msisdn":"254708374149"}"#).unwrap();
        let payload = serde_json::to_value(request.into_payload(&config).unwrap()).unwrap();

        assert_eq!(payload["ShortCode"], "600980");
        assert_eq!(payload["CommandID"], "CustomerPayBillOnline");
        assert_eq!(payload["Msisdn"], "254708374149");
        assert_eq!(payload["BillRefNumber"], "account");
    }

    #[test]
    fn register_url_falls_back_to_configured_callbacks() {
        let config = test_config("http://localhost");
        let payload = RegisterUrlRequest::default().into_payload(&config).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["ResponseType"], "Completed");
        assert_eq!(
            json["ConfirmationURL"],
            "https://gateway.example.com/mpesa/confirmation"
        );
        assert_eq!(
            json["ValidationURL"],
            "https://gateway.example.com/mpesa/validation"
        );
    }

    #[test]
    fn register_url_rejects_non_http_callbacks() {
        let config = test_config("http://localhost");
        for bad in ["mailto:ops@example.com", "ftp://files.example.com/confirm"] {
            let request = RegisterUrlRequest {
                confirmation_url: Some(bad.to_string()),
                ..Default::default()
            };
            assert!(
                matches!(request.into_payload(&config), Err(AppError::InvalidRequest(_))),
                "{bad}"
            );
        }

        let request = RegisterUrlRequest {
            validation_url: Some("http://localhost:3000/validation".to_string()),
            ..Default::default()
        };
        assert!(request.into_payload(&config).is_ok());
    }

    #[test]
    fn register_url_rejects_unknown_response_type() {
        let config = test_config("http://localhost");
        let request = RegisterUrlRequest {
            response_type: Some("Maybe".to_string()),
            ..Default::default()
        };
        assert!(request.into_payload(&config).is_err());
    }
}
