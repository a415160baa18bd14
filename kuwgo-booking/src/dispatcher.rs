use futures_util::future::join_all;
use kuwgo_core::{BookingRepository, Clock, MessagingSender, NotificationRepository};
use kuwgo_shared::pii::Masked;
use kuwgo_shared::{Booking, BookingStatus, Notification, NotificationType, Trip, TripStatus};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::BookingResult;

pub const KUWAIT_DIALING_CODE: &str = "+965";
const LOCAL_NUMBER_DIGITS: usize = 8;

/// Local eight-digit numbers get the Kuwait country code; anything else is sent as-is.
pub fn normalize_phone(phone: &str) -> String {
    let trimmed = phone.trim();
    let is_local = !trimmed.starts_with('+')
        && trimmed.len() == LOCAL_NUMBER_DIGITS
        && trimmed.chars().all(|c| c.is_ascii_digit());

    if is_local {
        format!("{}{}", KUWAIT_DIALING_CODE, trimmed)
    } else {
        trimmed.to_string()
    }
}

pub fn delay_message(trip: &Trip) -> String {
    format!(
        "KuwGo Rail: your trip {} is delayed by {} minutes. We apologize for the inconvenience.",
        trip.short_id(),
        trip.delay_minutes.unwrap_or(0)
    )
}

/// Outcome of one fan-out; failed sends are counted, never raised
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchReport {
    pub trip_id: Option<Uuid>,
    pub attempted: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Sends passenger messages and writes every attempt to the audit trail
pub struct NotificationDispatcher {
    bookings: Arc<dyn BookingRepository>,
    notifications: Arc<dyn NotificationRepository>,
    sender: Arc<dyn MessagingSender>,
    clock: Arc<dyn Clock>,
}

impl NotificationDispatcher {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        notifications: Arc<dyn NotificationRepository>,
        sender: Arc<dyn MessagingSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            notifications,
            sender,
            clock,
        }
    }

    /// Only a delay produces messages: one SMS per non-cancelled booking, sent concurrently
    pub async fn on_trip_status_changed(&self, trip: &Trip) -> BookingResult<DispatchReport> {
        if trip.status != TripStatus::Delayed {
            return Ok(DispatchReport { trip_id: Some(trip.id), ..Default::default() });
        }

        let affected: Vec<Booking> = self
            .bookings
            .list_by_trip(trip.id)
            .await?
            .into_iter()
            .filter(|b| b.status != BookingStatus::Cancelled)
            .collect();

        let message = delay_message(trip);
        let sends = affected
            .iter()
            .map(|booking| self.send_sms(&booking.passenger_phone, &message, Some(trip.id), Some(booking.id)));
        let results = join_all(sends).await;

        let sent = results.iter().filter(|ok| **ok).count();
        let report = DispatchReport {
            trip_id: Some(trip.id),
            attempted: results.len(),
            sent,
            failed: results.len() - sent,
        };

        info!(
            trip_id = %trip.id,
            "Delay notifications dispatched: {} sent, {} failed",
            report.sent, report.failed
        );
        Ok(report)
    }

    /// Send one SMS and record it; returns whether the provider accepted it
    pub async fn send_sms(&self, phone: &str, text: &str, trip_id: Option<Uuid>, booking_id: Option<Uuid>) -> bool {
        let recipient = normalize_phone(phone);
        let outcome = self.sender.send_sms(&recipient, text).await;
        if !outcome.success {
            warn!(
                to = %Masked(&recipient),
                "SMS failed: {}",
                outcome.error_message.as_deref().unwrap_or("unknown error")
            );
        }

        let success = outcome.success;
        let record = Notification::record(
            recipient,
            text.to_string(),
            NotificationType::Sms,
            trip_id,
            booking_id,
            outcome,
            self.clock.now(),
        );
        self.audit(&record).await;
        success
    }

    pub async fn send_email(&self, address: &str, subject: &str, body: &str, booking_id: Option<Uuid>) -> bool {
        let outcome = self.sender.send_email(address, subject, body).await;
        if !outcome.success {
            warn!(
                to = %Masked(address),
                "Email failed: {}",
                outcome.error_message.as_deref().unwrap_or("unknown error")
            );
        }

        let success = outcome.success;
        let record = Notification::record(
            address.to_string(),
            format!("{}: {}", subject, body),
            NotificationType::Email,
            None,
            booking_id,
            outcome,
            self.clock.now(),
        );
        self.audit(&record).await;
        success
    }

    pub async fn list_notifications(&self) -> BookingResult<Vec<Notification>> {
        Ok(self.notifications.list_all().await?)
    }

    async fn audit(&self, record: &Notification) {
        if let Err(e) = self.notifications.record(record).await {
            error!("Failed to record notification {}: {}", record.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryBookingRepository, InMemoryNotificationRepository};
    use chrono::TimeZone;
    use kuwgo_core::{FixedClock, LogOnlySender};
    use kuwgo_shared::time::kuwait_offset;

    #[tokio::test]
    async fn test_email_audit_keeps_subject() {
        let notifications = Arc::new(InMemoryNotificationRepository::new());
        let now = kuwait_offset().with_ymd_and_hms(2025, 12, 28, 8, 0, 0).unwrap();
        let dispatcher = NotificationDispatcher::new(
            Arc::new(InMemoryBookingRepository::new()),
            notifications.clone(),
            Arc::new(LogOnlySender),
            Arc::new(FixedClock::new(now)),
        );

        let booking_id = Uuid::new_v4();
        assert!(dispatcher.send_email("rider@example.com", "Your receipt", "Seat 4 confirmed", Some(booking_id)).await);

        let stored = notifications.list_all().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].message, "Your receipt: Seat 4 confirmed");
        assert_eq!(stored[0].notification_type, NotificationType::Email);
        assert_eq!(stored[0].booking_id, Some(booking_id));
    }

    #[test]
    fn test_local_numbers_get_country_code() {
        assert_eq!(normalize_phone("12345678"), "+96512345678");
        assert_eq!(normalize_phone(" 55512345 "), "+96555512345");
    }

    #[test]
    fn test_other_numbers_untouched() {
        assert_eq!(normalize_phone("+15551234567"), "+15551234567");
        assert_eq!(normalize_phone("1234567"), "1234567");
        assert_eq!(normalize_phone("123456789"), "123456789");
    }
}
