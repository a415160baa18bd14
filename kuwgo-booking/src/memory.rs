use async_trait::async_trait;
use kuwgo_core::{BookingRepository, NotificationRepository, RedemptionRepository, StoreResult};
use kuwgo_shared::{Booking, BookingStatus, Notification, PointRedemption};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Bookings held in process memory; used by tests and single-node demos
#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        let mut bookings = self.bookings.write().unwrap_or_else(|e| e.into_inner());
        if bookings.contains_key(&booking.id) {
            return Err(format!("booking {} already exists", booking.id).into());
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.bookings.read().unwrap_or_else(|e| e.into_inner()).get(&id).cloned())
    }

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<()> {
        let mut bookings = self.bookings.write().unwrap_or_else(|e| e.into_inner());
        match bookings.get_mut(&id) {
            Some(booking) => {
                booking.status = status;
                Ok(())
            }
            None => Err(format!("booking {} not found", id).into()),
        }
    }

    async fn delete_booking(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.bookings.write().unwrap_or_else(|e| e.into_inner()).remove(&id).is_some())
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().unwrap_or_else(|e| e.into_inner());
        let mut owned: Vec<Booking> = bookings.values().filter(|b| b.is_owned_by(user_id)).cloned().collect();
        owned.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(owned)
    }

    async fn list_by_trip(&self, trip_id: Uuid) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().unwrap_or_else(|e| e.into_inner());
        Ok(bookings.values().filter(|b| b.trip_id == trip_id).cloned().collect())
    }

    async fn list_seat_holding(&self) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.read().unwrap_or_else(|e| e.into_inner());
        Ok(bookings.values().filter(|b| b.status.holds_seat()).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryRedemptionRepository {
    redemptions: RwLock<Vec<PointRedemption>>,
}

impl InMemoryRedemptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RedemptionRepository for InMemoryRedemptionRepository {
    async fn append_redemption(&self, redemption: &PointRedemption) -> StoreResult<()> {
        self.redemptions.write().unwrap_or_else(|e| e.into_inner()).push(redemption.clone());
        Ok(())
    }

    async fn list_redemptions(&self, user_id: &str) -> StoreResult<Vec<PointRedemption>> {
        let redemptions = self.redemptions.read().unwrap_or_else(|e| e.into_inner());
        let mut owned: Vec<PointRedemption> =
            redemptions.iter().filter(|r| r.user_id == user_id).cloned().collect();
        owned.sort_by(|a, b| b.redemption_date.cmp(&a.redemption_date));
        Ok(owned)
    }

    async fn total_redeemed(&self, user_id: &str) -> StoreResult<i64> {
        let redemptions = self.redemptions.read().unwrap_or_else(|e| e.into_inner());
        Ok(redemptions.iter().filter(|r| r.user_id == user_id).map(|r| r.points_redeemed).sum())
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn record(&self, notification: &Notification) -> StoreResult<()> {
        self.notifications.write().unwrap_or_else(|e| e.into_inner()).push(notification.clone());
        Ok(())
    }

    async fn list_all(&self) -> StoreResult<Vec<Notification>> {
        let notifications = self.notifications.read().unwrap_or_else(|e| e.into_inner());
        // Appended in creation order; newest first means reverse
        Ok(notifications.iter().rev().cloned().collect())
    }
}
