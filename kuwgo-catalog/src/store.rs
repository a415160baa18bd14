use async_trait::async_trait;
use kuwgo_core::{StoreResult, TripCatalog, TripFilter};
use kuwgo_shared::time::Timestamp;
use kuwgo_shared::{Station, Train, Trip, TripStatus};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::CatalogError;

/// In-memory catalog of stations, trains and trips
pub struct InMemoryCatalog {
    stations: RwLock<HashMap<Uuid, Station>>,
    trains: RwLock<HashMap<Uuid, Train>>,
    trips: RwLock<HashMap<Uuid, Trip>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self {
            stations: RwLock::new(HashMap::new()),
            trains: RwLock::new(HashMap::new()),
            trips: RwLock::new(HashMap::new()),
        }
    }

    pub fn add_station(&self, station: Station) {
        self.stations.write().unwrap_or_else(|e| e.into_inner()).insert(station.id, station);
    }

    pub fn add_train(&self, train: Train) {
        self.trains.write().unwrap_or_else(|e| e.into_inner()).insert(train.id, train);
    }

    /// Register a trip; its train and stations must already be known
    pub fn add_trip(&self, trip: Trip) -> Result<(), CatalogError> {
        if !trip.has_valid_schedule() {
            return Err(CatalogError::InvalidSchedule(trip.id));
        }
        if !self.trains.read().unwrap_or_else(|e| e.into_inner()).contains_key(&trip.train_id) {
            return Err(CatalogError::UnknownTrain(trip.train_id));
        }
        {
            let stations = self.stations.read().unwrap_or_else(|e| e.into_inner());
            for station_id in [trip.from_station_id, trip.to_station_id] {
                if !stations.contains_key(&station_id) {
                    return Err(CatalogError::UnknownStation(station_id));
                }
            }
        }

        self.trips.write().unwrap_or_else(|e| e.into_inner()).insert(trip.id, trip);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.trips.read().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    fn sorted_trips(&self, keep: impl Fn(&Trip) -> bool) -> Vec<Trip> {
        let trips = self.trips.read().unwrap_or_else(|e| e.into_inner());
        let mut selected: Vec<Trip> = trips.values().filter(|t| keep(t)).cloned().collect();
        selected.sort_by_key(|t| t.departure_time);
        selected
    }
}

impl Default for InMemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TripCatalog for InMemoryCatalog {
    async fn get_trip(&self, id: Uuid) -> StoreResult<Option<Trip>> {
        Ok(self.trips.read().unwrap_or_else(|e| e.into_inner()).get(&id).cloned())
    }

    async fn get_train(&self, id: Uuid) -> StoreResult<Option<Train>> {
        Ok(self.trains.read().unwrap_or_else(|e| e.into_inner()).get(&id).cloned())
    }

    async fn list_stations(&self) -> StoreResult<Vec<Station>> {
        let mut stations: Vec<Station> =
            self.stations.read().unwrap_or_else(|e| e.into_inner()).values().cloned().collect();
        stations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(stations)
    }

    async fn list_upcoming_trips(&self, filter: &TripFilter, now: Timestamp) -> StoreResult<Vec<Trip>> {
        Ok(self.sorted_trips(|t| filter.matches(t, now)))
    }

    async fn list_live_trips(&self, now: Timestamp) -> StoreResult<Vec<Trip>> {
        Ok(self.sorted_trips(|t| t.arrival_time >= now))
    }

    async fn update_trip_status(
        &self,
        id: Uuid,
        status: TripStatus,
        delay_minutes: Option<u32>,
    ) -> StoreResult<Option<Trip>> {
        let mut trips = self.trips.write().unwrap_or_else(|e| e.into_inner());
        Ok(trips.get_mut(&id).map(|trip| {
            trip.set_status(status, delay_minutes);
            trip.clone()
        }))
    }

    async fn mark_arrived(&self, now: Timestamp) -> StoreResult<Vec<Trip>> {
        let mut trips = self.trips.write().unwrap_or_else(|e| e.into_inner());
        let mut arrived = Vec::new();

        for trip in trips.values_mut() {
            if trip.has_arrived(now) && !matches!(trip.status, TripStatus::Arrived | TripStatus::Cancelled) {
                trip.set_status(TripStatus::Arrived, None);
                arrived.push(trip.clone());
            }
        }

        if !arrived.is_empty() {
            info!("Marked {} trip(s) as arrived", arrived.len());
        }
        Ok(arrived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::DemoSeed;
    use chrono::{Duration, TimeZone};
    use kuwgo_shared::time::kuwait_offset;

    fn now() -> Timestamp {
        kuwait_offset().with_ymd_and_hms(2025, 12, 28, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_upcoming_trips_sorted_by_departure() {
        let catalog = InMemoryCatalog::new();
        DemoSeed::apply(&catalog, now()).unwrap();

        let trips = catalog.list_upcoming_trips(&TripFilter::default(), now()).await.unwrap();
        assert_eq!(trips.len(), 3);
        assert!(trips.windows(2).all(|w| w[0].departure_time <= w[1].departure_time));
    }

    #[tokio::test]
    async fn test_add_trip_rejects_inverted_schedule() {
        let catalog = InMemoryCatalog::new();
        DemoSeed::apply(&catalog, now()).unwrap();
        let template = catalog.list_live_trips(now()).await.unwrap().remove(0);

        let mut trip = Trip::new(
            template.train_id,
            template.from_station_id,
            template.to_station_id,
            now() + Duration::hours(2),
            now() + Duration::hours(1),
        );
        assert!(matches!(catalog.add_trip(trip.clone()), Err(CatalogError::InvalidSchedule(_))));

        trip.train_id = Uuid::new_v4();
        trip.arrival_time = now() + Duration::hours(3);
        assert!(matches!(catalog.add_trip(trip), Err(CatalogError::UnknownTrain(_))));
    }

    #[tokio::test]
    async fn test_mark_arrived_only_touches_finished_trips() {
        let catalog = InMemoryCatalog::new();
        DemoSeed::apply(&catalog, now()).unwrap();

        // The earliest seeded trip arrives at now+2h; the others at now+3h and now+4h
        let later = now() + Duration::hours(2) + Duration::minutes(30);
        let arrived = catalog.mark_arrived(later).await.unwrap();
        assert_eq!(arrived.len(), 1);
        assert_eq!(arrived[0].status, TripStatus::Arrived);

        // Re-running is a no-op
        assert!(catalog.mark_arrived(later).await.unwrap().is_empty());

        let live = catalog.list_live_trips(later).await.unwrap();
        assert_eq!(live.len(), 2);
    }

    #[tokio::test]
    async fn test_update_status_unknown_trip() {
        let catalog = InMemoryCatalog::new();
        let updated = catalog.update_trip_status(Uuid::new_v4(), TripStatus::Delayed, Some(10)).await.unwrap();
        assert!(updated.is_none());
    }
}
