//! Cache Store Module
//!
//! Main store engine: a HashMap of entries, each guarded by a lifetime timer
//! and an idle timer, all behind one mutex.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::cache::entry::CacheEntry;
use crate::cache::stats::CacheStats;
use crate::cache::timer::{deadline_after, ExpiryKind, ExpiryTimer};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::spawn_expiry_waiter;

/// Outcome of a waiter waking up at its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fired {
    /// The entry was removed by this timer
    Removed,
    /// The timer was reset since it was armed; sleep until the new deadline
    Rearm(Instant),
    /// The entry is already gone or was replaced by a newer one
    Gone,
}

// == Shared State ==
/// State shared between store handles and expiry waiters.
pub(crate) struct Shared<V> {
    max_lifetime: Duration,
    max_idle_lifetime: Duration,
    state: Mutex<State<V>>,
}

struct State<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_id: u64,
    stats: CacheStats,
}

impl<V> State<V> {
    /// Deletes an entry whose `kind` timer ran out and stops its sibling.
    fn expire(&mut self, identifier: &str, kind: ExpiryKind) -> Option<Arc<V>> {
        let entry = self.entries.remove(identifier)?;
        self.stats.record_expiration(kind);
        debug!(identifier, timer = %kind, "Entry expired");
        Some(entry.retire(kind))
    }
}

impl<V> Shared<V> {
    // == Removal Procedure ==
    /// Called by the waiter of `entry_id`'s `kind` timer once its deadline
    /// has passed.
    ///
    /// Idempotent: a fire for an entry that is already gone, or that has
    /// since been replaced under the same identifier, does nothing. A fire
    /// for a timer that was reset after it was armed asks the waiter to sleep
    /// again instead of removing.
    pub(crate) fn on_timer_fired(&self, identifier: &str, entry_id: u64, kind: ExpiryKind) -> Fired {
        let mut state = self.state.lock();
        let now = Instant::now();

        let deadline = match state.entries.get(identifier) {
            Some(entry) if entry.id == entry_id => entry.timer(kind).deadline(),
            _ => return Fired::Gone,
        };
        if deadline > now {
            trace!(identifier, timer = %kind, "Stale wake-up, re-arming");
            return Fired::Rearm(deadline);
        }

        let retired = state.expire(identifier, kind);
        drop(state);
        // value is released outside the lock
        drop(retired);
        Fired::Removed
    }
}

// == Cache Store ==
/// Key/value store with maximum-lifetime and idle-lifetime expiry.
///
/// Every entry carries two timers. The lifetime timer runs from insertion
/// or the last [`put`](Self::put) of the identifier; the idle timer runs from
/// insertion, the last `put` or the last successful [`get`](Self::get).
/// Whichever runs out first removes the entry.
///
/// `CacheStore` is a cheap handle: clones share the same entries. Expiry
/// waiters run as tasks on the tokio runtime captured at construction and
/// hold only a weak reference to the store, so dropping the last handle drops
/// every entry and stops every waiter.
pub struct CacheStore<V> {
    shared: Arc<Shared<V>>,
    runtime: Handle,
}

impl<V> Clone for CacheStore<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            runtime: self.runtime.clone(),
        }
    }
}

impl<V> CacheStore<V>
where
    V: Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty store on the current tokio runtime.
    ///
    /// The durations are not validated; zero makes entries expire at once.
    ///
    /// # Errors
    /// Returns [`crate::error::CacheError::Runtime`] when called outside a
    /// tokio runtime.
    pub fn new(max_lifetime: Duration, max_idle_lifetime: Duration) -> Result<Self> {
        let runtime = Handle::try_current()?;
        Ok(Self::with_handle(max_lifetime, max_idle_lifetime, runtime))
    }

    /// Creates an empty store with durations from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.max_lifetime, config.max_idle_lifetime)
    }

    /// Creates an empty store whose waiters run on `runtime`.
    ///
    /// Usable from synchronous code outside any runtime context.
    pub fn with_handle(max_lifetime: Duration, max_idle_lifetime: Duration, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                max_lifetime,
                max_idle_lifetime,
                state: Mutex::new(State {
                    entries: HashMap::new(),
                    next_id: 0,
                    stats: CacheStats::new(),
                }),
            }),
            runtime,
        }
    }

    // == Put ==
    /// Stores `value` under `identifier`.
    ///
    /// A new identifier gets a fresh entry with both timers armed. An
    /// existing one has its value replaced and both timers reset to their
    /// full durations, without spawning new waiters.
    pub fn put(&self, identifier: impl Into<String>, value: V) {
        let identifier = identifier.into();
        let value = Arc::new(value);

        let mut guard = self.shared.state.lock();
        let state = &mut *guard;
        let now = Instant::now();
        let lifetime_deadline = deadline_after(now, self.shared.max_lifetime);
        let idle_deadline = deadline_after(now, self.shared.max_idle_lifetime);

        let existing = state.entries.get(&identifier).map(|e| e.expired_by(now));
        let retired = match existing {
            Some(None) => {
                let previous = state
                    .entries
                    .get_mut(&identifier)
                    .map(|entry| entry.overwrite(value, lifetime_deadline, idle_deadline));
                state.stats.record_overwrite();
                debug!(identifier = %identifier, "Entry overwritten");
                drop(guard);
                drop(previous);
                return;
            }
            // waiter has not caught up yet; replace rather than revive
            Some(Some(kind)) => state.expire(&identifier, kind),
            None => None,
        };

        let id = state.next_id;
        state.next_id += 1;

        let lifetime = self.arm(&identifier, id, ExpiryKind::Lifetime, lifetime_deadline);
        let idle = self.arm(&identifier, id, ExpiryKind::Idle, idle_deadline);
        debug!(identifier = %identifier, id, "Entry inserted");

        state
            .entries
            .insert(identifier, CacheEntry::new(id, value, lifetime, idle));
        state.stats.record_insert();
        // replaced values are released outside the lock
        drop(guard);
        drop(retired);
    }

    fn arm(&self, identifier: &str, id: u64, kind: ExpiryKind, deadline: Instant) -> ExpiryTimer {
        let waiter = spawn_expiry_waiter(
            &self.runtime,
            self.downgrade(),
            identifier.to_string(),
            id,
            kind,
            deadline,
        );
        ExpiryTimer::new(deadline, waiter)
    }

    // == Get ==
    /// Returns the value stored under `identifier`, or `None` if it is
    /// absent or expired.
    ///
    /// A hit resets the idle timer; the lifetime timer is never touched by
    /// reads.
    pub fn get(&self, identifier: &str) -> Option<Arc<V>> {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;
        let now = Instant::now();

        let Some(entry) = state.entries.get_mut(identifier) else {
            state.stats.record_miss();
            trace!(identifier, "Miss");
            return None;
        };

        if let Some(kind) = entry.expired_by(now) {
            let retired = state.expire(identifier, kind);
            state.stats.record_miss();
            drop(guard);
            drop(retired);
            return None;
        }

        entry.touch(deadline_after(now, self.shared.max_idle_lifetime));
        let value = Arc::clone(&entry.value);
        state.stats.record_hit();
        trace!(identifier, "Hit");
        Some(value)
    }
}

impl<V> CacheStore<V> {
    // == Max Lifetime ==
    /// Returns the configured maximum lifetime.
    pub fn max_lifetime(&self) -> Duration {
        self.shared.max_lifetime
    }

    // == Max Idle Lifetime ==
    /// Returns the configured maximum idle lifetime.
    pub fn max_idle_lifetime(&self) -> Duration {
        self.shared.max_idle_lifetime
    }

    /// Weak reference handed to expiry waiters.
    pub(crate) fn downgrade(&self) -> Weak<Shared<V>> {
        Arc::downgrade(&self.shared)
    }

    // == Stats ==
    /// Returns a snapshot of the store statistics.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock();
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    // == Length ==
    /// Returns the number of entries currently held, including any whose
    /// deadline passed but whose waiter has not run yet.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("max_lifetime", &self.shared.max_lifetime)
            .field("max_idle_lifetime", &self.shared.max_idle_lifetime)
            .field("len", &self.len())
            .finish()
    }
}
