use kuwgo_booking::TripCleanupSweeper;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Runs the trip cleanup sweep on a fixed interval for the life of the process
pub async fn start_cleanup_worker(sweeper: TripCleanupSweeper, every: Duration) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!("Trip cleanup worker started, sweeping every {:?}", every);

    loop {
        ticker.tick().await;
        match sweeper.sweep_once().await {
            Ok(arrived) if !arrived.is_empty() => info!("Cleanup sweep closed {} trip(s)", arrived.len()),
            Ok(_) => {}
            // Storage may be briefly unavailable; the next tick retries
            Err(e) => error!("Cleanup sweep failed: {}", e),
        }
    }
}
