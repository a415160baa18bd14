use kuwgo_core::{CoreError, StoreError};
use kuwgo_shared::BookingStatus;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Seat {seat_number} on trip {trip_id} is already taken")]
    SeatTaken { trip_id: Uuid, seat_number: u32 },

    #[error("Cannot {action} a booking in status {from}")]
    InvalidState { from: BookingStatus, action: &'static str },

    #[error("Trip {0} has already departed")]
    TripAlreadyDeparted(Uuid),

    #[error("Invalid payment input: {0}")]
    InvalidPaymentInput(String),

    #[error("Insufficient points: balance {balance}, need {required}")]
    InsufficientPoints { balance: i64, required: i64 },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Seat {seat_number} does not exist on this train ({total_seats} seats)")]
    InvalidSeat { seat_number: u32, total_seats: u32 },

    #[error("Booking {0} belongs to another user")]
    NotOwner(Uuid),

    #[error("Resource busy, retry shortly")]
    Busy,

    #[error("Storage error: {0}")]
    Storage(String),
}

impl BookingError {
    pub fn booking_not_found(id: Uuid) -> Self {
        BookingError::NotFound { entity: "Booking", id: id.to_string() }
    }

    pub fn trip_not_found(id: Uuid) -> Self {
        BookingError::NotFound { entity: "Trip", id: id.to_string() }
    }

    /// Retryable errors are surfaced with a retry hint instead of a failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Busy)
    }
}

impl From<StoreError> for BookingError {
    fn from(e: StoreError) -> Self {
        BookingError::Storage(e.to_string())
    }
}

impl From<CoreError> for BookingError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::ValidationError(msg) => BookingError::InvalidPaymentInput(msg),
            CoreError::InternalError(msg) => BookingError::Storage(msg),
        }
    }
}

pub type BookingResult<T> = Result<T, BookingError>;
