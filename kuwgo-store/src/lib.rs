pub mod app_config;
pub mod booking_repo;
pub mod catalog_repo;
pub mod database;
pub mod events;
pub mod messaging;
pub mod notification_repo;
pub mod redis_repo;

pub use app_config::Config;
pub use booking_repo::{PgBookingRepository, PgRedemptionRepository};
pub use catalog_repo::PgTripCatalog;
pub use database::DbClient;
pub use events::EventProducer;
pub use messaging::{ConsoleEmailSender, PassengerMessenger, TwilioSmsSender};
pub use notification_repo::PgNotificationRepository;
pub use redis_repo::{RedisClient, RedisSeatLedger};
