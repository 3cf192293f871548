//! Expiry Waiter Task
//!
//! Background task that sleeps until one timer of an entry runs out and then
//! runs the store's removal procedure.

use std::sync::Weak;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::cache::timer::ExpiryKind;
use crate::cache::{Fired, Shared};

/// Spawns the waiter for the `kind` timer of entry `entry_id`.
///
/// The waiter sleeps until `deadline`, then asks the store whether the timer
/// really ran out. If the timer was reset in the meantime it sleeps until the
/// new deadline; otherwise it exits, either after removing the entry or
/// because the entry is already gone.
///
/// Only a weak reference to the store is held between wake-ups, so the waiter
/// also exits once the store itself has been dropped. Dropping the returned
/// handle does not stop the task; [`crate::cache::timer::ExpiryTimer`]
/// aborts it explicitly.
pub(crate) fn spawn_expiry_waiter<V>(
    runtime: &Handle,
    shared: Weak<Shared<V>>,
    identifier: String,
    entry_id: u64,
    kind: ExpiryKind,
    deadline: Instant,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    runtime.spawn(async move {
        let mut deadline = deadline;

        loop {
            sleep_until(deadline).await;

            let Some(shared) = shared.upgrade() else {
                trace!(identifier = %identifier, timer = %kind, "Store dropped, waiter exiting");
                break;
            };

            match shared.on_timer_fired(&identifier, entry_id, kind) {
                Fired::Rearm(next) => deadline = next,
                Fired::Removed | Fired::Gone => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::runtime::Handle;
    use tokio::time::{sleep, Instant};

    use super::spawn_expiry_waiter;
    use crate::cache::timer::ExpiryKind;
    use crate::cache::CacheStore;

    #[tokio::test(start_paused = true)]
    async fn test_waiter_removes_expired_entry() {
        let store: CacheStore<String> =
            CacheStore::new(Duration::from_secs(1), Duration::from_secs(10)).unwrap();
        store.put("expire_soon", "value".to_string());

        sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.len(), 0, "Expired entry should have been removed");
        assert_eq!(store.stats().lifetime_expirations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_preserves_live_entries() {
        let store: CacheStore<String> =
            CacheStore::new(Duration::from_secs(3600), Duration::from_secs(3600)).unwrap();
        store.put("long_lived", "value".to_string());

        sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.len(), 1, "Live entry should not be removed");
        assert_eq!(*store.get("long_lived").unwrap(), "value");
    }

    #[tokio::test(start_paused = true)]
    async fn test_waiter_exits_when_store_dropped() {
        let store: CacheStore<String> =
            CacheStore::new(Duration::from_secs(10), Duration::from_secs(10)).unwrap();
        store.put("key", "value".to_string());

        // An extra waiter for the entry's lifetime timer, woken early.
        let waiter = spawn_expiry_waiter(
            &Handle::current(),
            store.downgrade(),
            "key".to_string(),
            0,
            ExpiryKind::Lifetime,
            Instant::now() + Duration::from_secs(1),
        );

        sleep(Duration::from_millis(1500)).await;
        assert!(!waiter.is_finished(), "Waiter should re-arm while the store lives");

        drop(store);
        sleep(Duration::from_secs(9)).await;
        assert!(waiter.is_finished(), "Waiter should exit once the store is gone");
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_drop_releases_values() {
        let store: CacheStore<String> =
            CacheStore::new(Duration::from_secs(1), Duration::from_secs(1)).unwrap();
        store.put("key", "value".to_string());

        let value = store.get("key").unwrap();
        drop(store);

        // Only the handle returned earlier still references the value.
        assert_eq!(std::sync::Arc::strong_count(&value), 1);
    }
}
