use chrono::Duration;
use kuwgo_shared::time::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

/// Cancellations this close to departure lose the higher share
pub const LATE_CANCELLATION_WINDOW_HOURS: i64 = 24;
pub const LATE_DEDUCTION_PERCENT: i64 = 25;
pub const EARLY_DEDUCTION_PERCENT: i64 = 10;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RefundQuote {
    pub booking_id: Uuid,
    pub price: Decimal,
    pub deduction_percent: Decimal,
    pub refund_amount: Decimal,
}

impl RefundQuote {
    /// Two-decimal amount for receipts and SMS
    pub fn display_amount(&self) -> Decimal {
        self.refund_amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

pub fn deduction_percent(departure: Timestamp, now: Timestamp) -> Decimal {
    if departure - now <= Duration::hours(LATE_CANCELLATION_WINDOW_HOURS) {
        Decimal::from(LATE_DEDUCTION_PERCENT)
    } else {
        Decimal::from(EARLY_DEDUCTION_PERCENT)
    }
}

/// Callers guarantee `now < departure`; cancellation is refused otherwise
pub fn quote(booking_id: Uuid, price: Decimal, departure: Timestamp, now: Timestamp) -> RefundQuote {
    let deduction = deduction_percent(departure, now);
    let refund_amount = price * (Decimal::ONE_HUNDRED - deduction) / Decimal::ONE_HUNDRED;

    RefundQuote {
        booking_id,
        price,
        deduction_percent: deduction,
        refund_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kuwgo_shared::time::kuwait_offset;

    fn now() -> Timestamp {
        kuwait_offset().with_ymd_and_hms(2025, 12, 28, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_late_cancellation_loses_a_quarter() {
        let q = quote(Uuid::new_v4(), Decimal::from(10), now() + Duration::hours(2), now());
        assert_eq!(q.deduction_percent, Decimal::from(25));
        assert_eq!(q.refund_amount, Decimal::new(750, 2));
    }

    #[test]
    fn test_early_cancellation_loses_a_tenth() {
        let q = quote(Uuid::new_v4(), Decimal::from(10), now() + Duration::hours(48), now());
        assert_eq!(q.deduction_percent, Decimal::from(10));
        assert_eq!(q.refund_amount, Decimal::new(900, 2));
    }

    #[test]
    fn test_exactly_one_day_out_is_late() {
        let departure = now() + Duration::hours(24);
        assert_eq!(deduction_percent(departure, now()), Decimal::from(25));
        assert_eq!(deduction_percent(departure + Duration::seconds(1), now()), Decimal::from(10));
    }

    #[test]
    fn test_display_amount_rounds_to_two_places() {
        let q = quote(Uuid::new_v4(), Decimal::new(2005, 3), now() + Duration::hours(1), now());
        // 2.005 * 0.75 = 1.50375
        assert_eq!(q.display_amount(), Decimal::new(150, 2));
    }
}
