pub mod clock;
pub mod events;
pub mod messaging;
pub mod payment;
pub mod repository;

pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{EventPublisher, NoopEventPublisher};
pub use messaging::{LogOnlySender, MessagingSender};
pub use payment::{PaymentDetails, PaymentMethod};
pub use repository::{
    BookingRepository, NotificationRepository, RedemptionRepository, Reservation, SeatClaim,
    SeatConflict, SeatLedger, TripCatalog, TripFilter,
};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

/// Error type crossing every storage/collaborator seam
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

pub type StoreResult<T> = Result<T, StoreError>;
