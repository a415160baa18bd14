use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::time::Timestamp;

/// Owner recorded for bookings made without a signed-in user
pub const ANONYMOUS_USER: &str = "Anonymous";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    PendingPayment,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Seat-holding states keep a seat ledger entry alive
    pub fn holds_seat(&self) -> bool {
        matches!(self, BookingStatus::PendingPayment | BookingStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::PendingPayment => "PENDING_PAYMENT",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_PAYMENT" => Ok(BookingStatus::PendingPayment),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// One passenger on one seat of one trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub passenger_name: String,
    pub passenger_phone: String,
    /// Fixed when the booking is created, never recalculated
    pub price: Decimal,
    pub user_id: String,
    pub booking_date: Timestamp,
    pub status: BookingStatus,
}

impl Booking {
    pub fn new(
        trip_id: Uuid,
        seat_number: u32,
        passenger_name: String,
        passenger_phone: String,
        price: Decimal,
        user_id: Option<String>,
        booking_date: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            seat_number,
            passenger_name,
            passenger_phone,
            price,
            user_id: user_id.unwrap_or_else(|| ANONYMOUS_USER.to_string()),
            booking_date,
            status: BookingStatus::PendingPayment,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Booking reference printed on receipts and SMS
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::to_kuwait;
    use chrono::Utc;

    #[test]
    fn test_new_booking_is_pending_and_anonymous() {
        let booking = Booking::new(
            Uuid::new_v4(),
            12,
            "Fatma".to_string(),
            "55512345".to_string(),
            Decimal::new(2, 0),
            None,
            to_kuwait(Utc::now()),
        );
        assert_eq!(booking.status, BookingStatus::PendingPayment);
        assert_eq!(booking.user_id, ANONYMOUS_USER);
        assert!(booking.status.holds_seat());
        assert_eq!(booking.short_id().len(), 8);
    }

    #[test]
    fn test_cancelled_does_not_hold_seat() {
        assert!(!BookingStatus::Cancelled.holds_seat());
        assert!(BookingStatus::Confirmed.holds_seat());
        assert_eq!("CONFIRMED".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
    }
}
