use async_trait::async_trait;
use chrono::NaiveDate;
use kuwgo_shared::time::{day_window, Timestamp};
use kuwgo_shared::{Booking, BookingStatus, Notification, PointRedemption, Station, Train, Trip, TripStatus};
use serde::Deserialize;
use std::collections::BTreeSet;
use uuid::Uuid;

use crate::StoreResult;

/// Search criteria for the upcoming-trips listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripFilter {
    pub from: Option<Uuid>,
    pub to: Option<Uuid>,
    pub date: Option<NaiveDate>,
}

impl TripFilter {
    /// With a date, trips departing within that UTC+3 day; otherwise trips departing
    /// at or after `now`. Arrived trips never count as upcoming.
    pub fn matches(&self, trip: &Trip, now: Timestamp) -> bool {
        if trip.status == TripStatus::Arrived {
            return false;
        }
        if self.from.is_some_and(|from| trip.from_station_id != from) {
            return false;
        }
        if self.to.is_some_and(|to| trip.to_station_id != to) {
            return false;
        }
        match self.date.and_then(day_window) {
            Some((start, end)) => trip.departure_time >= start && trip.departure_time < end,
            None => trip.departure_time >= now,
        }
    }
}

/// Trip/train/station catalog. The engine reads it but does not own its consistency.
#[async_trait]
pub trait TripCatalog: Send + Sync {
    async fn get_trip(&self, id: Uuid) -> StoreResult<Option<Trip>>;

    async fn get_train(&self, id: Uuid) -> StoreResult<Option<Train>>;

    async fn list_stations(&self) -> StoreResult<Vec<Station>>;

    /// Ordered by departure time ascending
    async fn list_upcoming_trips(&self, filter: &TripFilter, now: Timestamp) -> StoreResult<Vec<Trip>>;

    /// Trips that have not arrived yet, ordered by departure time ascending
    async fn list_live_trips(&self, now: Timestamp) -> StoreResult<Vec<Trip>>;

    /// Returns the updated trip, or `None` when it does not exist
    async fn update_trip_status(
        &self,
        id: Uuid,
        status: TripStatus,
        delay_minutes: Option<u32>,
    ) -> StoreResult<Option<Trip>>;

    /// Mark every trip whose arrival time has passed as `Arrived`; returns the trips changed
    async fn mark_arrived(&self, now: Timestamp) -> StoreResult<Vec<Trip>>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()>;

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>>;

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<()>;

    /// Returns whether a record was removed
    async fn delete_booking(&self, id: Uuid) -> StoreResult<bool>;

    /// Newest first
    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>>;

    async fn list_by_trip(&self, trip_id: Uuid) -> StoreResult<Vec<Booking>>;

    /// Every booking currently in a seat-holding state, used to rebuild the seat ledger
    async fn list_seat_holding(&self) -> StoreResult<Vec<Booking>>;
}

/// Append-only points ledger
#[async_trait]
pub trait RedemptionRepository: Send + Sync {
    async fn append_redemption(&self, redemption: &PointRedemption) -> StoreResult<()>;

    async fn list_redemptions(&self, user_id: &str) -> StoreResult<Vec<PointRedemption>>;

    async fn total_redeemed(&self, user_id: &str) -> StoreResult<i64>;
}

/// Append-only audit trail of attempted sends
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn record(&self, notification: &Notification) -> StoreResult<()>;

    /// Newest first
    async fn list_all(&self) -> StoreResult<Vec<Notification>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reservation {
    Reserved,
    AlreadyTaken,
}

/// One live (trip, seat) → booking entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatClaim {
    pub trip_id: Uuid,
    pub seat_number: u32,
    pub booking_id: Uuid,
}

impl From<&Booking> for SeatClaim {
    fn from(booking: &Booking) -> Self {
        Self {
            trip_id: booking.trip_id,
            seat_number: booking.seat_number,
            booking_id: booking.id,
        }
    }
}

/// Raised by a booking store whose own uniqueness guarantee rejected a second
/// live booking for a seat. Callers downcast the store error to detect it.
#[derive(Debug, thiserror::Error)]
#[error("seat {seat_number} on trip {trip_id} is held by another booking")]
pub struct SeatConflict {
    pub trip_id: Uuid,
    pub seat_number: u32,
}

/// Which booking holds which seat. `try_reserve` must be atomic per (trip, seat):
/// among concurrent callers for the same key exactly one observes `Reserved`.
#[async_trait]
pub trait SeatLedger: Send + Sync {
    async fn try_reserve(&self, trip_id: Uuid, seat_number: u32, booking_id: Uuid) -> StoreResult<Reservation>;

    /// Idempotent: releasing a free seat is a no-op
    async fn release(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<()>;

    async fn holder(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<Option<Uuid>>;

    /// Point-in-time snapshot; may be stale as soon as it is returned
    async fn list_taken(&self, trip_id: Uuid) -> StoreResult<BTreeSet<u32>>;

    /// Make sure every claim derived from persisted bookings is present.
    /// Entries already in the ledger stay, including other instances' claims.
    async fn restore(&self, claims: &[SeatClaim]) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use kuwgo_shared::time::kuwait_offset;

    fn trip_at(departure: Timestamp, from: Uuid, to: Uuid) -> Trip {
        Trip::new(Uuid::new_v4(), from, to, departure, departure + Duration::hours(1))
    }

    #[test]
    fn test_filter_without_date_excludes_departed() {
        let now = kuwait_offset().with_ymd_and_hms(2025, 12, 28, 10, 0, 0).unwrap();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let filter = TripFilter::default();

        assert!(filter.matches(&trip_at(now + Duration::minutes(5), a, b), now));
        assert!(!filter.matches(&trip_at(now - Duration::minutes(5), a, b), now));
    }

    #[test]
    fn test_filter_by_stations_and_day() {
        let now = kuwait_offset().with_ymd_and_hms(2025, 12, 28, 10, 0, 0).unwrap();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let filter = TripFilter {
            from: Some(a),
            to: Some(b),
            date: NaiveDate::from_ymd_opt(2025, 12, 29),
        };

        let next_day = now + Duration::days(1);
        assert!(filter.matches(&trip_at(next_day, a, b), now));
        assert!(!filter.matches(&trip_at(next_day, a, c), now));
        assert!(!filter.matches(&trip_at(now + Duration::hours(1), a, b), now));
    }

    #[test]
    fn test_arrived_trips_are_not_upcoming() {
        let now = kuwait_offset().with_ymd_and_hms(2025, 12, 28, 10, 0, 0).unwrap();
        let mut trip = trip_at(now + Duration::hours(1), Uuid::new_v4(), Uuid::new_v4());
        trip.set_status(TripStatus::Arrived, None);
        assert!(!TripFilter::default().matches(&trip, now));
    }
}
