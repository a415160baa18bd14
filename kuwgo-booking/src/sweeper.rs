use kuwgo_core::{Clock, TripCatalog};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::dispatcher::NotificationDispatcher;
use crate::error::BookingResult;

/// Archives trips that have arrived. Bookings and seat claims are left alone.
pub struct TripCleanupSweeper {
    catalog: Arc<dyn TripCatalog>,
    dispatcher: Arc<NotificationDispatcher>,
    clock: Arc<dyn Clock>,
}

impl TripCleanupSweeper {
    pub fn new(catalog: Arc<dyn TripCatalog>, dispatcher: Arc<NotificationDispatcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            dispatcher,
            clock,
        }
    }

    /// One pass; returns the ids of trips marked `Arrived`
    pub async fn sweep_once(&self) -> BookingResult<Vec<Uuid>> {
        let now = self.clock.now();
        let arrived = self.catalog.mark_arrived(now).await?;

        for trip in &arrived {
            self.dispatcher.on_trip_status_changed(trip).await?;
        }

        debug!("Cleanup sweep at {} archived {} trip(s)", now, arrived.len());
        Ok(arrived.into_iter().map(|t| t.id).collect())
    }
}
