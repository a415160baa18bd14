use kuwgo_shared::BookingStatus;
use std::fmt;

use crate::error::{BookingError, BookingResult};

/// Lifecycle actions a caller can request on an existing booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Confirm,
    Cancel,
    Delete,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Cancel => "cancel",
            BookingAction::Delete => "delete",
        }
    }
}

impl fmt::Display for BookingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a transition leaves the booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Becomes(BookingStatus),
    /// The record is removed from the store
    Removed,
}

/// Exhaustive transition table. Anything not listed here is rejected.
pub fn transition(from: BookingStatus, action: BookingAction) -> BookingResult<Outcome> {
    use BookingAction::*;
    use BookingStatus::*;

    let outcome = match (from, action) {
        (PendingPayment, Confirm) => Outcome::Becomes(Confirmed),
        (PendingPayment, Cancel) => Outcome::Becomes(Cancelled),
        (Confirmed, Cancel) => Outcome::Becomes(Cancelled),
        (PendingPayment, Delete) => Outcome::Removed,
        (Cancelled, Delete) => Outcome::Removed,
        (Confirmed, Confirm) | (Cancelled, Confirm) | (Cancelled, Cancel) | (Confirmed, Delete) => {
            return Err(BookingError::InvalidState { from, action: action.as_str() })
        }
    };
    Ok(outcome)
}
