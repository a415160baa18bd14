pub mod models;
pub mod pii;
pub mod time;

pub use models::{
    Booking, BookingStatus, Notification, NotificationType, PointRedemption, SendOutcome, Station,
    Train, Trip, TripStatus,
};
pub use time::Timestamp;
