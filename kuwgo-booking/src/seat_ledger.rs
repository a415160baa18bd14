use async_trait::async_trait;
use kuwgo_core::{Reservation, SeatClaim, SeatLedger, StoreResult};
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use uuid::Uuid;

/// Single-process seat ledger. Each operation takes the map lock only for the
/// insert-if-absent itself, never across an await.
pub struct InMemorySeatLedger {
    seats: Mutex<HashMap<(Uuid, u32), Uuid>>,
}

impl InMemorySeatLedger {
    pub fn new() -> Self {
        Self {
            seats: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySeatLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SeatLedger for InMemorySeatLedger {
    async fn try_reserve(&self, trip_id: Uuid, seat_number: u32, booking_id: Uuid) -> StoreResult<Reservation> {
        let mut seats = self.seats.lock().unwrap_or_else(|e| e.into_inner());
        match seats.entry((trip_id, seat_number)) {
            Entry::Occupied(_) => Ok(Reservation::AlreadyTaken),
            Entry::Vacant(slot) => {
                slot.insert(booking_id);
                Ok(Reservation::Reserved)
            }
        }
    }

    async fn release(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<()> {
        self.seats.lock().unwrap_or_else(|e| e.into_inner()).remove(&(trip_id, seat_number));
        Ok(())
    }

    async fn holder(&self, trip_id: Uuid, seat_number: u32) -> StoreResult<Option<Uuid>> {
        Ok(self.seats.lock().unwrap_or_else(|e| e.into_inner()).get(&(trip_id, seat_number)).copied())
    }

    async fn list_taken(&self, trip_id: Uuid) -> StoreResult<BTreeSet<u32>> {
        let seats = self.seats.lock().unwrap_or_else(|e| e.into_inner());
        Ok(seats.keys().filter(|(trip, _)| *trip == trip_id).map(|(_, seat)| *seat).collect())
    }

    async fn restore(&self, claims: &[SeatClaim]) -> StoreResult<()> {
        let mut seats = self.seats.lock().unwrap_or_else(|e| e.into_inner());
        for claim in claims {
            seats.entry((claim.trip_id, claim.seat_number)).or_insert(claim.booking_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reserve_release_cycle() {
        let ledger = InMemorySeatLedger::new();
        let trip = Uuid::new_v4();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(ledger.try_reserve(trip, 7, first).await.unwrap(), Reservation::Reserved);
        assert_eq!(ledger.try_reserve(trip, 7, second).await.unwrap(), Reservation::AlreadyTaken);
        assert_eq!(ledger.holder(trip, 7).await.unwrap(), Some(first));

        ledger.release(trip, 7).await.unwrap();
        ledger.release(trip, 7).await.unwrap();
        assert_eq!(ledger.try_reserve(trip, 7, second).await.unwrap(), Reservation::Reserved);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_single_winner() {
        let ledger = Arc::new(InMemorySeatLedger::new());
        let trip = Uuid::new_v4();

        let mut handles = Vec::new();
        for _ in 0..32 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move { ledger.try_reserve(trip, 1, Uuid::new_v4()).await.unwrap() }));
        }

        let mut reserved = 0;
        for handle in handles {
            if handle.await.unwrap() == Reservation::Reserved {
                reserved += 1;
            }
        }
        assert_eq!(reserved, 1);
    }

    #[tokio::test]
    async fn test_list_taken_is_per_trip() {
        let ledger = InMemorySeatLedger::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        ledger.try_reserve(a, 3, Uuid::new_v4()).await.unwrap();
        ledger.try_reserve(a, 1, Uuid::new_v4()).await.unwrap();
        ledger.try_reserve(b, 2, Uuid::new_v4()).await.unwrap();

        let taken: Vec<u32> = ledger.list_taken(a).await.unwrap().into_iter().collect();
        assert_eq!(taken, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_restore_keeps_live_claims() {
        let ledger = InMemorySeatLedger::new();
        let trip = Uuid::new_v4();
        let live = Uuid::new_v4();
        ledger.try_reserve(trip, 9, live).await.unwrap();

        let booking = Uuid::new_v4();
        ledger
            .restore(&[
                SeatClaim { trip_id: trip, seat_number: 4, booking_id: booking },
                SeatClaim { trip_id: trip, seat_number: 9, booking_id: Uuid::new_v4() },
            ])
            .await
            .unwrap();

        assert_eq!(ledger.holder(trip, 4).await.unwrap(), Some(booking));
        assert_eq!(ledger.holder(trip, 9).await.unwrap(), Some(live));
    }
}
