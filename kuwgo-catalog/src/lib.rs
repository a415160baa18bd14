pub mod seed;
pub mod store;

pub use seed::DemoSeed;
pub use store::InMemoryCatalog;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Trip {0} must arrive after it departs")]
    InvalidSchedule(uuid::Uuid),

    #[error("Unknown train: {0}")]
    UnknownTrain(uuid::Uuid),

    #[error("Unknown station: {0}")]
    UnknownStation(uuid::Uuid),
}
