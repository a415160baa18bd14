use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Kuwaiti debit network; the customer must enter the card PIN
    #[default]
    Knet,
    /// Authenticated on the customer's device before the request arrives
    ApplePay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Knet => "KNET",
            PaymentMethod::ApplePay => "APPLE_PAY",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment form as submitted by the client. No payment rail is modelled;
/// the details are only validated.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaymentDetails {
    #[serde(default)]
    pub method: PaymentMethod,
    pub bank: Option<String>,
    pub card_number: Option<String>,
    pub expiry_date: Option<String>,
    pub pin: Option<String>,
    /// Where to send the email receipt
    pub receipt_email: Option<String>,
}

impl PaymentDetails {
    pub fn validate(&self) -> CoreResult<()> {
        match self.method {
            PaymentMethod::Knet => {
                let has_pin = self.pin.as_deref().map(|p| !p.trim().is_empty()).unwrap_or(false);
                if !has_pin {
                    return Err(CoreError::ValidationError("PIN is required for K-Net payments".to_string()));
                }
                Ok(())
            }
            PaymentMethod::ApplePay => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knet_requires_pin() {
        let mut details = PaymentDetails { method: PaymentMethod::Knet, ..Default::default() };
        assert!(details.validate().is_err());

        details.pin = Some("   ".to_string());
        assert!(details.validate().is_err());

        details.pin = Some("1234".to_string());
        assert!(details.validate().is_ok());
    }

    #[test]
    fn test_apple_pay_is_preauthenticated() {
        let details = PaymentDetails { method: PaymentMethod::ApplePay, ..Default::default() };
        assert!(details.validate().is_ok());
    }

    #[test]
    fn test_method_wire_names() {
        let method: PaymentMethod = serde_json::from_str("\"APPLE_PAY\"").unwrap();
        assert_eq!(method, PaymentMethod::ApplePay);
        assert_eq!(PaymentMethod::Knet.to_string(), "KNET");
    }
}
