use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use crate::StoreResult;

/// Outbound domain-event channel (Kafka in production)
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, topic: &str, key: &str, payload: &str) -> StoreResult<()>;
}

/// Publisher used when no broker is configured
pub struct NoopEventPublisher;

#[async_trait]
impl EventPublisher for NoopEventPublisher {
    async fn publish(&self, topic: &str, key: &str, _payload: &str) -> StoreResult<()> {
        tracing::debug!("Event {} for {} dropped (no broker configured)", topic, key);
        Ok(())
    }
}

/// Serialize and publish an event. Failures are logged and swallowed: events
/// describe committed transitions and never roll them back.
pub async fn publish_event<E: Serialize>(publisher: &dyn EventPublisher, topic: &str, key: &str, event: &E) {
    let payload = match serde_json::to_string(event) {
        Ok(p) => p,
        Err(e) => {
            warn!("Failed to serialize event for {}: {}", topic, e);
            return;
        }
    };

    if let Err(e) = publisher.publish(topic, key, &payload).await {
        warn!("Failed to publish event to {}: {}", topic, e);
    }
}
