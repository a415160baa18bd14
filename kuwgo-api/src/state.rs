use std::sync::Arc;
use kuwgo_booking::BookingEngine;
use kuwgo_core::{Clock, TripCatalog};
use kuwgo_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub catalog: Arc<dyn TripCatalog>,
    pub clock: Arc<dyn Clock>,
    /// None disables per-IP rate limiting
    pub rate_limiter: Option<Arc<RedisClient>>,
    pub rate_limit_per_minute: i64,
    pub auth: AuthConfig,
}
