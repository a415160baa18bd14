use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kuwgo_catalog::DemoSeed;
use kuwgo_core::{StoreResult, TripCatalog, TripFilter};
use kuwgo_shared::time::{day_window, to_kuwait, Timestamp};
use kuwgo_shared::{Station, Train, Trip, TripStatus};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;
use uuid::Uuid;

pub struct PgTripCatalog {
    pool: PgPool,
}

impl PgTripCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert the demo network when the trips table is empty
    pub async fn seed_demo_data(&self, now: Timestamp) -> StoreResult<bool> {
        let (trip_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trips").fetch_one(&self.pool).await?;
        if trip_count > 0 {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;

        for station in DemoSeed::stations() {
            sqlx::query(
                "INSERT INTO stations (id, name, latitude, longitude) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
            )
            .bind(station.id)
            .bind(&station.name)
            .bind(station.latitude)
            .bind(station.longitude)
            .execute(&mut *tx)
            .await?;
        }

        for train in DemoSeed::trains() {
            sqlx::query(
                "INSERT INTO trains (id, train_number, train_type, total_seats) VALUES ($1, $2, $3, $4) ON CONFLICT (id) DO NOTHING",
            )
            .bind(train.id)
            .bind(&train.train_number)
            .bind(&train.train_type)
            .bind(train.total_seats as i32)
            .execute(&mut *tx)
            .await?;
        }

        for trip in DemoSeed::trips(now) {
            sqlx::query(
                r#"
                INSERT INTO trips (id, train_id, from_station_id, to_station_id, departure_time, arrival_time, status, delay_minutes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(trip.id)
            .bind(trip.train_id)
            .bind(trip.from_station_id)
            .bind(trip.to_station_id)
            .bind(trip.departure_time.with_timezone(&Utc))
            .bind(trip.arrival_time.with_timezone(&Utc))
            .bind(trip.status.as_str())
            .bind(trip.delay_minutes.map(|m| m as i32))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!("Seeded demo stations, trains and trips");
        Ok(true)
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    train_id: Uuid,
    from_station_id: Uuid,
    to_station_id: Uuid,
    departure_time: DateTime<Utc>,
    arrival_time: DateTime<Utc>,
    status: String,
    delay_minutes: Option<i32>,
}

impl TryFrom<TripRow> for Trip {
    type Error = String;

    fn try_from(row: TripRow) -> Result<Self, Self::Error> {
        Ok(Trip {
            id: row.id,
            train_id: row.train_id,
            from_station_id: row.from_station_id,
            to_station_id: row.to_station_id,
            departure_time: to_kuwait(row.departure_time),
            arrival_time: to_kuwait(row.arrival_time),
            status: row.status.parse::<TripStatus>()?,
            delay_minutes: row.delay_minutes.and_then(|m| u32::try_from(m).ok()),
        })
    }
}

#[derive(sqlx::FromRow)]
struct TrainRow {
    id: Uuid,
    train_number: String,
    train_type: String,
    total_seats: i32,
}

#[derive(sqlx::FromRow)]
struct StationRow {
    id: Uuid,
    name: String,
    latitude: f64,
    longitude: f64,
}

const TRIP_COLUMNS: &str =
    "id, train_id, from_station_id, to_station_id, departure_time, arrival_time, status, delay_minutes";

fn into_trips(rows: Vec<TripRow>) -> StoreResult<Vec<Trip>> {
    rows.into_iter().map(|r| Trip::try_from(r).map_err(Into::into)).collect()
}

#[async_trait]
impl TripCatalog for PgTripCatalog {
    async fn get_trip(&self, id: Uuid) -> StoreResult<Option<Trip>> {
        let row: Option<TripRow> = sqlx::query_as(&format!("SELECT {} FROM trips WHERE id = $1", TRIP_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Trip::try_from).transpose()?)
    }

    async fn get_train(&self, id: Uuid) -> StoreResult<Option<Train>> {
        let row: Option<TrainRow> =
            sqlx::query_as("SELECT id, train_number, train_type, total_seats FROM trains WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|r| Train {
            id: r.id,
            train_number: r.train_number,
            train_type: r.train_type,
            total_seats: r.total_seats.max(0) as u32,
        }))
    }

    async fn list_stations(&self) -> StoreResult<Vec<Station>> {
        let rows: Vec<StationRow> =
            sqlx::query_as("SELECT id, name, latitude, longitude FROM stations ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| Station {
                id: r.id,
                name: r.name,
                latitude: r.latitude,
                longitude: r.longitude,
            })
            .collect())
    }

    async fn list_upcoming_trips(&self, filter: &TripFilter, now: Timestamp) -> StoreResult<Vec<Trip>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM trips WHERE status <> ", TRIP_COLUMNS));
        query.push_bind(TripStatus::Arrived.as_str());

        if let Some(from) = filter.from {
            query.push(" AND from_station_id = ").push_bind(from);
        }
        if let Some(to) = filter.to {
            query.push(" AND to_station_id = ").push_bind(to);
        }
        match filter.date.and_then(day_window) {
            Some((start, end)) => {
                query.push(" AND departure_time >= ").push_bind(start.with_timezone(&Utc));
                query.push(" AND departure_time < ").push_bind(end.with_timezone(&Utc));
            }
            None => {
                query.push(" AND departure_time >= ").push_bind(now.with_timezone(&Utc));
            }
        }
        query.push(" ORDER BY departure_time ASC");

        let rows: Vec<TripRow> = query.build_query_as().fetch_all(&self.pool).await?;
        into_trips(rows)
    }

    async fn list_live_trips(&self, now: Timestamp) -> StoreResult<Vec<Trip>> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!(
            "SELECT {} FROM trips WHERE arrival_time >= $1 ORDER BY departure_time ASC",
            TRIP_COLUMNS
        ))
        .bind(now.with_timezone(&Utc))
        .fetch_all(&self.pool)
        .await?;

        into_trips(rows)
    }

    async fn update_trip_status(
        &self,
        id: Uuid,
        status: TripStatus,
        delay_minutes: Option<u32>,
    ) -> StoreResult<Option<Trip>> {
        // Same normalisation as the in-memory catalog: delay only survives on Delayed
        let delay = match status {
            TripStatus::Delayed => delay_minutes.map(|m| m as i32),
            _ => None,
        };

        let row: Option<TripRow> = sqlx::query_as(&format!(
            "UPDATE trips SET status = $1, delay_minutes = $2 WHERE id = $3 RETURNING {}",
            TRIP_COLUMNS
        ))
        .bind(status.as_str())
        .bind(delay)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Trip::try_from).transpose()?)
    }

    async fn mark_arrived(&self, now: Timestamp) -> StoreResult<Vec<Trip>> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!(
            "UPDATE trips SET status = $1, delay_minutes = NULL WHERE arrival_time <= $2 AND status NOT IN ($1, $3) RETURNING {}",
            TRIP_COLUMNS
        ))
        .bind(TripStatus::Arrived.as_str())
        .bind(now.with_timezone(&Utc))
        .bind(TripStatus::Cancelled.as_str())
        .fetch_all(&self.pool)
        .await?;

        if !rows.is_empty() {
            info!("Marked {} trip(s) as arrived", rows.len());
        }
        into_trips(rows)
    }
}
