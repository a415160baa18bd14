use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use kuwgo_api::{app, worker, AppState, AuthConfig};
use kuwgo_booking::{BookingEngine, EngineDeps, EngineSettings};
use kuwgo_core::{Clock, EventPublisher, NoopEventPublisher, SystemClock};
use kuwgo_store::{
    Config, DbClient, EventProducer, PassengerMessenger, PgBookingRepository, PgNotificationRepository,
    PgRedemptionRepository, PgTripCatalog, RedisClient, RedisSeatLedger,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kuwgo_api=debug,kuwgo_booking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting KuwGo Rail API on port {}", config.server.port);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Postgres
    let db = DbClient::new(&config.database.url).await.context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let catalog = Arc::new(PgTripCatalog::new(db.pool.clone()));
    if config.business_rules.seed_demo_data {
        catalog.seed_demo_data(clock.now()).await.map_err(|e| anyhow!(e))?;
    }

    // Redis
    let redis = Arc::new(RedisClient::new(&config.redis.url).await.context("Failed to connect to Redis")?);

    // Kafka
    let events: Arc<dyn EventPublisher> = if config.kafka.brokers.is_empty() {
        tracing::info!("No Kafka brokers configured; events will not be published");
        Arc::new(NoopEventPublisher)
    } else {
        Arc::new(EventProducer::new(&config.kafka.brokers).context("Failed to create Kafka producer")?)
    };

    let sender = Arc::new(PassengerMessenger::new(config.twilio.as_ref()).context("Failed to build messaging client")?);

    let deps = EngineDeps {
        catalog: catalog.clone(),
        bookings: Arc::new(PgBookingRepository::new(db.pool.clone())),
        redemptions: Arc::new(PgRedemptionRepository::new(db.pool.clone())),
        notifications: Arc::new(PgNotificationRepository::new(db.pool.clone())),
        seats: Arc::new(RedisSeatLedger::new(&redis)),
        sender,
        events,
        clock: clock.clone(),
    };
    let settings = EngineSettings {
        seat_price: config.business_rules.seat_price,
        lock_timeout: config.business_rules.lock_timeout(),
        default_receipt_email: config.business_rules.default_receipt_email.clone(),
    };
    let engine = Arc::new(BookingEngine::new(deps, settings));

    engine.restore_seat_ledger().await.context("Failed to restore seat ledger")?;

    tokio::spawn(worker::start_cleanup_worker(engine.sweeper(), config.business_rules.cleanup_interval()));

    let app_state = AppState {
        engine,
        catalog,
        clock,
        rate_limiter: Some(redis),
        rate_limit_per_minute: config.business_rules.rate_limit_per_minute,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
