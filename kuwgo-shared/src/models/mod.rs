pub mod booking;
pub mod events;
pub mod loyalty;
pub mod notification;
pub mod trip;

pub use booking::{Booking, BookingStatus, ANONYMOUS_USER};
pub use loyalty::PointRedemption;
pub use notification::{Notification, NotificationType, SendOutcome};
pub use trip::{Station, Train, Trip, TripStatus};
