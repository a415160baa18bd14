use rust_decimal::Decimal;
use uuid::Uuid;

pub const BOOKING_CONFIRMED_TOPIC: &str = "booking.confirmed";
pub const BOOKING_CANCELLED_TOPIC: &str = "booking.cancelled";
pub const TRIP_STATUS_TOPIC: &str = "trip.status_changed";

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub user_id: String,
    pub price: Decimal,
    pub payment_method: String,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCancelledEvent {
    pub booking_id: Uuid,
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub deduction_percent: Decimal,
    pub refund_amount: Decimal,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct TripStatusChangedEvent {
    pub trip_id: Uuid,
    pub status: String,
    pub delay_minutes: Option<u32>,
    pub notifications_attempted: usize,
    pub timestamp: i64,
}
