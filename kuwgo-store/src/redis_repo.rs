use async_trait::async_trait;
use kuwgo_core::{Reservation, SeatClaim, SeatLedger, StoreResult};
use redis::{AsyncCommands, RedisResult};
use std::collections::BTreeSet;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter; true while the caller is within `limit`
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .expire(key, window_seconds)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

/// Seat ledger shared by every API instance: one hash per trip, field = seat
/// number, value = holding booking id.
#[derive(Clone)]
pub struct RedisSeatLedger {
    client: redis::Client,
}

impl RedisSeatLedger {
    pub fn new(redis: &RedisClient) -> Self {
        Self {
            client: redis.client.clone(),
        }
    }

    fn trip_key(trip_id: Uuid) -> String {
        format!("seats:trip:{}", trip_id)
    }

    fn restore_pipeline(claims: &[SeatClaim]) -> redis::Pipeline {
        let mut pipe = redis::pipe();
        pipe.atomic();
        for claim in claims {
            pipe.hset_nx(Self::trip_key(claim.trip_id), claim.seat_number, claim.booking_id.to_string());
        }
        pipe
    }
}

#[async_trait]
impl SeatLedger for RedisSeatLedger {
    async fn try_reserve(&self, trip_id: Uuid, seat_number: u32, booking_id: Uuid) -> StoreResult<Reservation> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // HSETNX: only set if the seat field does not exist
        let reserved: bool = conn.hset_nx(Self::trip_key(trip_id), seat_number, booking_id.to_string()).await?;

        Ok(if reserved { Reservation::Reserved } else { Reservation::AlreadyTaken })
    }

    async fn release(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.hdel::<_, _, ()>(Self::trip_key(trip_id), seat_number).await?;
        Ok(())
    }

    async fn holder(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<Option<Uuid>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.hget(Self::trip_key(trip_id), seat_number).await?;
        Ok(value.map(|v| Uuid::parse_str(&v)).transpose()?)
    }

    async fn list_taken(&self, trip_id: Uuid) -> StoreResult<BTreeSet<u32>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let seats: Vec<u32> = conn.hkeys(Self::trip_key(trip_id)).await?;
        Ok(seats.into_iter().collect())
    }

    async fn restore(&self, claims: &[SeatClaim]) -> StoreResult<()> {
        if claims.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // Other instances may be claiming seats right now; only fill gaps
        let added: Vec<bool> = Self::restore_pipeline(claims).query_async(&mut conn).await?;
        let added = added.into_iter().filter(|added| *added).count();

        info!("Restored {} seat claim(s) into Redis, {} already present", added, claims.len() - added);
        Ok(())
    }
}
