pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod locks;
pub mod loyalty;
pub mod memory;
pub mod refund;
pub mod seat_ledger;
pub mod state_machine;
pub mod sweeper;

pub use dispatcher::{normalize_phone, DispatchReport, NotificationDispatcher};
pub use engine::{BookingEngine, Cancellation, EngineDeps, EngineSettings, NewBooking, TripStatusUpdate};
pub use error::{BookingError, BookingResult};
pub use loyalty::{LoyaltyLedger, LoyaltySummary};
pub use memory::{InMemoryBookingRepository, InMemoryNotificationRepository, InMemoryRedemptionRepository};
pub use refund::RefundQuote;
pub use seat_ledger::InMemorySeatLedger;
pub use sweeper::TripCleanupSweeper;
