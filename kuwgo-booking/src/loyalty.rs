use kuwgo_core::{BookingRepository, RedemptionRepository};
use kuwgo_shared::models::loyalty::{POINTS_PER_CURRENCY_UNIT, REDEMPTION_UNIT};
use kuwgo_shared::time::Timestamp;
use kuwgo_shared::{Booking, BookingStatus, PointRedemption};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::{BookingError, BookingResult};
use crate::locks::{KeyGuard, KeyedLocks};

/// Rewards page contents for one user
#[derive(Debug, Clone, Serialize)]
pub struct LoyaltySummary {
    pub user_id: String,
    pub balance: i64,
    pub redeemable_tickets: i64,
    pub confirmed_bookings: Vec<Booking>,
    pub redemptions: Vec<PointRedemption>,
}

/// Points earned from confirmed bookings; fractional points are dropped
pub fn earned_points(bookings: &[Booking]) -> i64 {
    let spent: Decimal = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .map(|b| b.price)
        .sum();
    (spent * Decimal::from(POINTS_PER_CURRENCY_UNIT)).trunc().to_i64().unwrap_or(i64::MAX)
}

/// Derived points ledger. The balance is never stored; it is folded from
/// confirmed bookings and the append-only redemption log on every read.
pub struct LoyaltyLedger {
    bookings: Arc<dyn BookingRepository>,
    redemptions: Arc<dyn RedemptionRepository>,
    locks: KeyedLocks<String>,
}

impl LoyaltyLedger {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        redemptions: Arc<dyn RedemptionRepository>,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            bookings,
            redemptions,
            locks: KeyedLocks::new("loyalty", lock_timeout),
        }
    }

    pub async fn balance(&self, user_id: &str) -> BookingResult<i64> {
        let bookings = self.bookings.list_by_user(user_id).await?;
        let redeemed = self.redemptions.total_redeemed(user_id).await?;
        Ok(earned_points(&bookings) - redeemed)
    }

    /// Hold off redemptions for `user_id` while one of their confirmed bookings changes
    pub async fn lock_user(&self, user_id: &str) -> BookingResult<KeyGuard> {
        self.locks.acquire(&user_id.to_string()).await
    }

    /// Spend one redemption unit. The read-check-append runs under the user's lock
    /// so two concurrent redemptions cannot both pass the balance check.
    pub async fn redeem(&self, user_id: &str, now: Timestamp) -> BookingResult<PointRedemption> {
        let _guard = self.lock_user(user_id).await?;

        let balance = self.balance(user_id).await?;
        if balance < REDEMPTION_UNIT {
            return Err(BookingError::InsufficientPoints { balance, required: REDEMPTION_UNIT });
        }

        let redemption = PointRedemption::free_ticket(user_id, now);
        self.redemptions.append_redemption(&redemption).await?;

        info!(user_id = %user_id, "Redeemed {} points, {} left", REDEMPTION_UNIT, balance - REDEMPTION_UNIT);
        Ok(redemption)
    }

    pub async fn summary(&self, user_id: &str) -> BookingResult<LoyaltySummary> {
        let bookings = self.bookings.list_by_user(user_id).await?;
        let redemptions = self.redemptions.list_redemptions(user_id).await?;

        let redeemed: i64 = redemptions.iter().map(|r| r.points_redeemed).sum();
        let balance = earned_points(&bookings) - redeemed;
        let confirmed_bookings: Vec<Booking> =
            bookings.into_iter().filter(|b| b.status == BookingStatus::Confirmed).collect();

        Ok(LoyaltySummary {
            user_id: user_id.to_string(),
            balance,
            redeemable_tickets: (balance / REDEMPTION_UNIT).max(0),
            confirmed_bookings,
            redemptions,
        })
    }
}
