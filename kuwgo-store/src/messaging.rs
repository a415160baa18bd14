//! Outbound passenger messaging: SMS through Twilio's REST API, email to the
//! console. Both fold every failure into a `SendOutcome`.

use async_trait::async_trait;
use kuwgo_core::{LogOnlySender, MessagingSender};
use kuwgo_shared::pii::Masked;
use kuwgo_shared::SendOutcome;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info};

use crate::app_config::TwilioConfig;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

pub struct TwilioSmsSender {
    http_client: Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
}

impl TwilioSmsSender {
    pub fn new(config: &TwilioConfig) -> Result<Self, reqwest::Error> {
        Self::with_base_url(config, TWILIO_API_BASE)
    }

    pub fn with_base_url(config: &TwilioConfig, base_url: &str) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            http_client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from_number: config.from_number.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid)
    }
}

/// Messages sender that delivers SMS via Twilio and emails via the console
pub struct PassengerMessenger {
    sms: Option<TwilioSmsSender>,
    email: ConsoleEmailSender,
}

impl PassengerMessenger {
    /// Without Twilio credentials SMS fall back to log-only delivery
    pub fn new(twilio: Option<&TwilioConfig>) -> Result<Self, reqwest::Error> {
        let sms = twilio.map(TwilioSmsSender::new).transpose()?;
        if sms.is_none() {
            info!("Twilio not configured; SMS will be logged only");
        }
        Ok(Self {
            sms,
            email: ConsoleEmailSender,
        })
    }
}

#[async_trait]
impl MessagingSender for PassengerMessenger {
    async fn send_sms(&self, phone: &str, text: &str) -> SendOutcome {
        match &self.sms {
            Some(twilio) => twilio.send_sms(phone, text).await,
            None => LogOnlySender.send_sms(phone, text).await,
        }
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> SendOutcome {
        self.email.send_email(address, subject, body).await
    }
}

#[async_trait]
impl MessagingSender for TwilioSmsSender {
    async fn send_sms(&self, phone: &str, text: &str) -> SendOutcome {
        let params = [("To", phone), ("From", self.from_number.as_str()), ("Body", text)];

        let response = match self
            .http_client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                error!(to = %Masked(phone), "Twilio request failed: {}", e);
                return SendOutcome::failed(e.to_string());
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(to = %Masked(phone), "Twilio rejected SMS ({}): {}", status, error_body);
            return SendOutcome::failed(format!("Twilio returned {}: {}", status, error_body));
        }

        info!(to = %Masked(phone), "SMS sent via Twilio");
        SendOutcome::sent()
    }

    async fn send_email(&self, _address: &str, _subject: &str, _body: &str) -> SendOutcome {
        SendOutcome::failed("email is not supported by the SMS provider")
    }
}

/// Writes emails to the log instead of sending them
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailSender;

#[async_trait]
impl MessagingSender for ConsoleEmailSender {
    async fn send_sms(&self, phone: &str, text: &str) -> SendOutcome {
        LogOnlySender.send_sms(phone, text).await
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> SendOutcome {
        info!(to = %Masked(address), subject = %subject, "Email (console): {}", body);
        SendOutcome::sent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "+96550000000".to_string(),
        }
    }

    #[test]
    fn test_messages_url() {
        let sender = TwilioSmsSender::with_base_url(&config(), "http://localhost:9999/").unwrap();
        assert_eq!(sender.messages_url(), "http://localhost:9999/Accounts/AC123/Messages.json");
    }

    #[tokio::test]
    async fn test_unreachable_provider_reports_failure() {
        // Nothing listens on port 9; the send must fail without panicking
        let sender = TwilioSmsSender::with_base_url(&config(), "http://127.0.0.1:9").unwrap();
        let outcome = sender.send_sms("+96555512345", "hello").await;
        assert!(!outcome.success);
        assert!(outcome.error_message.is_some());
    }

    #[tokio::test]
    async fn test_messenger_without_twilio_logs_sms() {
        let messenger = PassengerMessenger::new(None).unwrap();
        assert!(messenger.send_sms("+96555512345", "hello").await.success);
        assert!(messenger.send_email("a@b.c", "subject", "body").await.success);
    }
}
