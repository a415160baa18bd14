use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::warn;

use crate::error::{BookingError, BookingResult};

/// One exclusive async lock per key, acquired with a bounded wait.
/// Unrelated keys never contend with each other.
pub struct KeyedLocks<K> {
    name: &'static str,
    timeout: Duration,
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of a decision section; released on drop
pub struct KeyGuard {
    _guard: OwnedMutexGuard<()>,
}

impl<K> KeyedLocks<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new(name: &'static str, timeout: Duration) -> Self {
        Self {
            name,
            timeout,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Wait at most the configured timeout; `Busy` otherwise
    pub async fn acquire(&self, key: &K) -> BookingResult<KeyGuard> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            // Drop slots nobody holds or waits on so the map tracks live keys only
            slots.retain(|_, lock| Arc::strong_count(lock) > 1);
            slots.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
        };

        match tokio::time::timeout(self.timeout, slot.lock_owned()).await {
            Ok(guard) => Ok(KeyGuard { _guard: guard }),
            Err(_) => {
                warn!("Timed out waiting for {} lock on {:?}", self.name, key);
                Err(BookingError::Busy)
            }
        }
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_times_out_while_held() {
        let locks = KeyedLocks::new("test", Duration::from_millis(50));
        let _held = locks.acquire(&1u32).await.unwrap();

        let result = locks.acquire(&1u32).await;
        assert!(matches!(result, Err(BookingError::Busy)));
    }

    #[tokio::test]
    async fn test_different_keys_do_not_contend() {
        let locks = KeyedLocks::new("test", Duration::from_millis(50));
        let _a = locks.acquire(&1u32).await.unwrap();
        assert!(locks.acquire(&2u32).await.is_ok());
    }

    #[tokio::test]
    async fn test_released_slots_are_pruned() {
        let locks = KeyedLocks::new("test", Duration::from_millis(50));
        for key in 0..10u32 {
            let _guard = locks.acquire(&key).await.unwrap();
        }
        // Only the most recently inserted slot can survive the next prune
        assert!(locks.tracked() <= 1);

        drop(locks.acquire(&1u32).await.unwrap());
        assert!(locks.acquire(&1u32).await.is_ok());
    }
}
