use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::time::Timestamp;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    Sms,
    Email,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::Sms => "SMS",
            NotificationType::Email => "EMAIL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SMS" => Some(NotificationType::Sms),
            "EMAIL" => Some(NotificationType::Email),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a messaging sender reports back; senders never fail outright
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendOutcome {
    pub success: bool,
    pub error_message: Option<String>,
}

impl SendOutcome {
    pub fn sent() -> Self {
        Self { success: true, error_message: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error_message: Some(error.into()) }
    }
}

/// Audit record of one attempted send, successful or not
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub trip_id: Option<Uuid>,
    pub booking_id: Option<Uuid>,
    pub is_sent: bool,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

impl Notification {
    pub fn record(
        recipient: String,
        message: String,
        notification_type: NotificationType,
        trip_id: Option<Uuid>,
        booking_id: Option<Uuid>,
        outcome: SendOutcome,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient,
            message,
            notification_type,
            trip_id,
            booking_id,
            is_sent: outcome.success,
            error_message: outcome.error_message,
            created_at,
        }
    }
}
