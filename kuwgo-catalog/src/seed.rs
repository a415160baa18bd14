//! Demo network used in development: eight Kuwaiti stations, three trains and
//! three trips scheduled relative to the current time.

use chrono::Duration;
use kuwgo_shared::time::Timestamp;
use kuwgo_shared::{Station, Train, Trip, TripStatus};
use uuid::Uuid;

use crate::store::InMemoryCatalog;
use crate::CatalogError;

const CENTRAL: Uuid = Uuid::from_u128(0x11111111_1111_1111_1111_111111111111);
const HAWALLY: Uuid = Uuid::from_u128(0x22222222_2222_2222_2222_222222222222);
const JAHRA: Uuid = Uuid::from_u128(0x33333333_3333_3333_3333_333333333333);
const FARWANIYA: Uuid = Uuid::from_u128(0x44444444_4444_4444_4444_444444444444);
const SALMIYA: Uuid = Uuid::from_u128(0x55555555_5555_5555_5555_555555551111);
const AHMADI: Uuid = Uuid::from_u128(0x55555555_5555_5555_5555_555555552222);
const MUBARAK_AL_KABEER: Uuid = Uuid::from_u128(0x66666666_6666_6666_6666_666666666666);
const FAHAHEEL: Uuid = Uuid::from_u128(0x77777777_7777_7777_7777_777777777777);

const KWT_101: Uuid = Uuid::from_u128(0xaaaa1111_1111_1111_1111_111111111111);
const KWT_102: Uuid = Uuid::from_u128(0xaaaa2222_2222_2222_2222_222222222222);
const KWT_103: Uuid = Uuid::from_u128(0xaaaa3333_3333_3333_3333_333333333333);

pub struct DemoSeed;

impl DemoSeed {
    pub fn stations() -> Vec<Station> {
        let station = |id, name: &str, latitude, longitude| Station {
            id,
            name: name.to_string(),
            latitude,
            longitude,
        };

        vec![
            station(CENTRAL, "Kuwait Central", 29.3759, 47.9774),
            station(HAWALLY, "Hawally", 29.3333, 48.0167),
            station(JAHRA, "Jahra", 29.3375, 47.6581),
            station(FARWANIYA, "Farwaniya", 29.2833, 47.9500),
            station(SALMIYA, "Salmiya", 29.3333, 48.0833),
            station(AHMADI, "Ahmadi", 29.0769, 48.0669),
            station(MUBARAK_AL_KABEER, "Mubarak Al-Kabeer", 29.2125, 48.0617),
            station(FAHAHEEL, "Fahaheel", 29.0833, 48.1333),
        ]
    }

    pub fn trains() -> Vec<Train> {
        let train = |id, number: &str, kind: &str, total_seats| Train {
            id,
            train_number: number.to_string(),
            train_type: kind.to_string(),
            total_seats,
        };

        vec![
            train(KWT_101, "KWT-101", "Express", 200),
            train(KWT_102, "KWT-102", "VIP", 120),
            train(KWT_103, "KWT-103", "Local", 300),
        ]
    }

    pub fn trips(now: Timestamp) -> Vec<Trip> {
        let mut delayed = Trip::new(
            KWT_103,
            HAWALLY,
            MUBARAK_AL_KABEER,
            now + Duration::hours(2),
            now + Duration::hours(3),
        );
        delayed.set_status(TripStatus::Delayed, Some(15));

        vec![
            Trip::new(KWT_101, CENTRAL, JAHRA, now + Duration::hours(1), now + Duration::hours(2)),
            Trip::new(KWT_102, CENTRAL, SALMIYA, now + Duration::hours(3), now + Duration::hours(4)),
            delayed,
        ]
    }

    /// Seed an in-memory catalog. Stations and trains are keyed by fixed ids so
    /// re-applying is harmless; trips are only added to an empty catalog.
    pub fn apply(catalog: &InMemoryCatalog, now: Timestamp) -> Result<(), CatalogError> {
        for station in Self::stations() {
            catalog.add_station(station);
        }
        for train in Self::trains() {
            catalog.add_train(train);
        }
        if catalog.is_empty() {
            for trip in Self::trips(now) {
                catalog.add_trip(trip)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuwgo_core::SystemClock;
    use kuwgo_core::Clock;

    #[test]
    fn test_seed_is_idempotent() {
        let catalog = InMemoryCatalog::new();
        let now = SystemClock.now();
        DemoSeed::apply(&catalog, now).unwrap();
        DemoSeed::apply(&catalog, now).unwrap();

        let trips = DemoSeed::trips(now);
        assert_eq!(trips.len(), 3);
        assert!(trips.iter().all(|t| t.has_valid_schedule()));
        assert_eq!(trips.iter().filter(|t| t.status == TripStatus::Delayed).count(), 1);
    }

    #[test]
    fn test_seed_trips_reference_seeded_trains() {
        let train_ids: Vec<Uuid> = DemoSeed::trains().iter().map(|t| t.id).collect();
        let station_ids: Vec<Uuid> = DemoSeed::stations().iter().map(|s| s.id).collect();
        for trip in DemoSeed::trips(SystemClock.now()) {
            assert!(train_ids.contains(&trip.train_id));
            assert!(station_ids.contains(&trip.from_station_id));
            assert!(station_ids.contains(&trip.to_station_id));
        }
    }
}
