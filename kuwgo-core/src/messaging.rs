use async_trait::async_trait;
use kuwgo_shared::pii::Masked;
use kuwgo_shared::SendOutcome;

/// Best-effort outbound messaging. Implementations never return an error:
/// every failure is folded into the returned `SendOutcome`.
#[async_trait]
pub trait MessagingSender: Send + Sync {
    async fn send_sms(&self, phone: &str, text: &str) -> SendOutcome;

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> SendOutcome;
}

/// Logs messages instead of delivering them; reports every send as successful.
pub struct LogOnlySender;

#[async_trait]
impl MessagingSender for LogOnlySender {
    async fn send_sms(&self, phone: &str, text: &str) -> SendOutcome {
        tracing::info!(to = %Masked(phone), "SMS (log only): {}", text);
        SendOutcome::sent()
    }

    async fn send_email(&self, address: &str, subject: &str, body: &str) -> SendOutcome {
        tracing::info!(to = %Masked(address), subject = %subject, "Email (log only): {}", body);
        SendOutcome::sent()
    }
}
