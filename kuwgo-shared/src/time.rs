//! All stored and displayed instants use a fixed UTC+3 offset (Kuwait time, no DST).

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

pub type Timestamp = DateTime<FixedOffset>;

pub const KUWAIT_OFFSET_SECONDS: i32 = 3 * 3600;

pub fn kuwait_offset() -> FixedOffset {
    FixedOffset::east_opt(KUWAIT_OFFSET_SECONDS).expect("UTC+3 is within the FixedOffset range")
}

/// Re-express any instant in the UTC+3 convention.
pub fn to_kuwait<Tz: TimeZone>(instant: DateTime<Tz>) -> Timestamp {
    instant.with_timezone(&kuwait_offset())
}

/// Half-open `[start, end)` window covering one UTC+3 calendar day.
pub fn day_window(date: NaiveDate) -> Option<(Timestamp, Timestamp)> {
    let start = date.and_hms_opt(0, 0, 0)?;
    let start = kuwait_offset().from_local_datetime(&start).single()?;
    Some((start, start + chrono::Duration::days(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_to_kuwait_keeps_instant() {
        let utc = Utc.with_ymd_and_hms(2025, 12, 28, 8, 0, 0).unwrap();
        let local = to_kuwait(utc);
        assert_eq!(local, utc);
        assert_eq!(local.format("%H:%M").to_string(), "11:00");
    }

    #[test]
    fn test_day_window_is_local_midnight() {
        let (start, end) = day_window(NaiveDate::from_ymd_opt(2025, 12, 28).unwrap()).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-12-28T00:00:00+03:00");
        assert_eq!(end - start, chrono::Duration::days(1));
    }
}
