use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kuwgo_core::{BookingRepository, RedemptionRepository, SeatConflict, StoreResult};
use kuwgo_shared::time::to_kuwait;
use kuwgo_shared::{Booking, BookingStatus, PointRedemption};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    trip_id: Uuid,
    seat_number: i32,
    passenger_name: String,
    passenger_phone: String,
    price: Decimal,
    user_id: String,
    booking_date: DateTime<Utc>,
    status: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = String;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            trip_id: row.trip_id,
            seat_number: u32::try_from(row.seat_number).map_err(|e| e.to_string())?,
            passenger_name: row.passenger_name,
            passenger_phone: row.passenger_phone,
            price: row.price,
            user_id: row.user_id,
            booking_date: to_kuwait(row.booking_date),
            status: row.status.parse::<BookingStatus>()?,
        })
    }
}

const BOOKING_COLUMNS: &str =
    "id, trip_id, seat_number, passenger_name, passenger_phone, price, user_id, booking_date, status";

fn into_bookings(rows: Vec<BookingRow>) -> StoreResult<Vec<Booking>> {
    rows.into_iter().map(|r| Booking::try_from(r).map_err(Into::into)).collect()
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn insert_booking(&self, booking: &Booking) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO bookings (id, trip_id, seat_number, passenger_name, passenger_phone, price, user_id, booking_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(booking.id)
        .bind(booking.trip_id)
        .bind(booking.seat_number as i32)
        .bind(&booking.passenger_name)
        .bind(&booking.passenger_phone)
        .bind(booking.price)
        .bind(&booking.user_id)
        .bind(booking.booking_date.with_timezone(&Utc))
        .bind(booking.status.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The partial unique index on live seats
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(SeatConflict {
                trip_id: booking.trip_id,
                seat_number: booking.seat_number,
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Option<Booking>> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Booking::try_from).transpose()?)
    }

    async fn update_booking_status(&self, id: Uuid, status: BookingStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(format!("booking {} not found", id).into());
        }
        Ok(())
    }

    async fn delete_booking(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY booking_date DESC",
            BOOKING_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_bookings(rows)
    }

    async fn list_by_trip(&self, trip_id: Uuid) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> =
            sqlx::query_as(&format!("SELECT {} FROM bookings WHERE trip_id = $1", BOOKING_COLUMNS))
                .bind(trip_id)
                .fetch_all(&self.pool)
                .await?;

        into_bookings(rows)
    }

    async fn list_seat_holding(&self) -> StoreResult<Vec<Booking>> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE status IN ($1, $2)",
            BOOKING_COLUMNS
        ))
        .bind(BookingStatus::PendingPayment.as_str())
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_bookings(rows)
    }
}

pub struct PgRedemptionRepository {
    pool: PgPool,
}

impl PgRedemptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RedemptionRow {
    id: Uuid,
    user_id: String,
    points_redeemed: i64,
    redemption_date: DateTime<Utc>,
    description: String,
}

impl From<RedemptionRow> for PointRedemption {
    fn from(row: RedemptionRow) -> Self {
        PointRedemption {
            id: row.id,
            user_id: row.user_id,
            points_redeemed: row.points_redeemed,
            redemption_date: to_kuwait(row.redemption_date),
            description: row.description,
        }
    }
}

#[async_trait]
impl RedemptionRepository for PgRedemptionRepository {
    async fn append_redemption(&self, redemption: &PointRedemption) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO point_redemptions (id, user_id, points_redeemed, redemption_date, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(redemption.id)
        .bind(&redemption.user_id)
        .bind(redemption.points_redeemed)
        .bind(redemption.redemption_date.with_timezone(&Utc))
        .bind(&redemption.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_redemptions(&self, user_id: &str) -> StoreResult<Vec<PointRedemption>> {
        let rows: Vec<RedemptionRow> = sqlx::query_as(
            "SELECT id, user_id, points_redeemed, redemption_date, description FROM point_redemptions WHERE user_id = $1 ORDER BY redemption_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PointRedemption::from).collect())
    }

    async fn total_redeemed(&self, user_id: &str) -> StoreResult<i64> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(points_redeemed), 0)::BIGINT FROM point_redemptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
