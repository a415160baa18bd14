use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::Timestamp;

/// Points earned per currency unit spent on confirmed bookings
pub const POINTS_PER_CURRENCY_UNIT: i64 = 10;

/// Points exchanged for one free ticket
pub const REDEMPTION_UNIT: i64 = 200;

/// Append-only ledger entry; never mutated or deleted once written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointRedemption {
    pub id: Uuid,
    pub user_id: String,
    pub points_redeemed: i64,
    pub redemption_date: Timestamp,
    pub description: String,
}

impl PointRedemption {
    pub fn free_ticket(user_id: &str, redemption_date: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            points_redeemed: REDEMPTION_UNIT,
            redemption_date,
            description: format!("Free ticket redemption ({} points)", REDEMPTION_UNIT),
        }
    }
}
