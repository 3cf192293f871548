//! Cache Entry Module
//!
//! Defines the structure for individual entries: a shared value and its two
//! expiry timers.

use std::sync::Arc;

use tokio::time::Instant;

use crate::cache::timer::{ExpiryKind, ExpiryTimer};

// == Cache Entry ==
/// A stored value plus its lifetime and idle timers.
///
/// Entries never leave the store; callers only see the `Arc<V>` handle.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// Store-wide unique id, so a waiter never acts on a successor entry
    pub id: u64,
    /// The stored value
    pub value: Arc<V>,
    lifetime: ExpiryTimer,
    idle: ExpiryTimer,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry from an already armed pair of timers.
    pub fn new(id: u64, value: Arc<V>, lifetime: ExpiryTimer, idle: ExpiryTimer) -> Self {
        Self {
            id,
            value,
            lifetime,
            idle,
        }
    }

    // == Timer ==
    /// Returns the lifetime or idle timer.
    pub fn timer(&self, kind: ExpiryKind) -> &ExpiryTimer {
        match kind {
            ExpiryKind::Lifetime => &self.lifetime,
            ExpiryKind::Idle => &self.idle,
        }
    }

    // == Expired By ==
    /// Returns which timer has run out at `now`, if any.
    ///
    /// The lifetime timer wins a tie.
    pub fn expired_by(&self, now: Instant) -> Option<ExpiryKind> {
        if self.lifetime.is_expired(now) {
            Some(ExpiryKind::Lifetime)
        } else if self.idle.is_expired(now) {
            Some(ExpiryKind::Idle)
        } else {
            None
        }
    }

    // == Overwrite ==
    /// Replaces the value and re-arms both timers, returning the old value.
    pub fn overwrite(
        &mut self,
        value: Arc<V>,
        lifetime_deadline: Instant,
        idle_deadline: Instant,
    ) -> Arc<V> {
        self.lifetime.reset(lifetime_deadline);
        self.idle.reset(idle_deadline);
        std::mem::replace(&mut self.value, value)
    }

    // == Touch ==
    /// Re-arms the idle timer only.
    pub fn touch(&mut self, idle_deadline: Instant) {
        self.idle.reset(idle_deadline);
    }

    // == Retire ==
    /// Consumes the entry after `fired` ran out, stopping the sibling waiter.
    ///
    /// The firing timer belongs to the calling waiter, which returns right
    /// after removal.
    pub fn retire(self, fired: ExpiryKind) -> Arc<V> {
        self.timer(fired.sibling()).stop();
        self.value
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pending_timer(deadline: Instant) -> ExpiryTimer {
        ExpiryTimer::new(deadline, tokio::spawn(std::future::pending::<()>()))
    }

    fn entry_at(now: Instant, lifetime: u64, idle: u64) -> CacheEntry<String> {
        CacheEntry::new(
            1,
            Arc::new("value".to_string()),
            pending_timer(now + Duration::from_secs(lifetime)),
            pending_timer(now + Duration::from_secs(idle)),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_by() {
        let now = Instant::now();
        let entry = entry_at(now, 3, 1);

        assert_eq!(entry.expired_by(now), None);
        assert_eq!(
            entry.expired_by(now + Duration::from_secs(1)),
            Some(ExpiryKind::Idle)
        );
        assert_eq!(
            entry.expired_by(now + Duration::from_secs(3)),
            Some(ExpiryKind::Lifetime)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_only_moves_idle() {
        let now = Instant::now();
        let mut entry = entry_at(now, 3, 1);
        let lifetime = entry.timer(ExpiryKind::Lifetime).deadline();

        entry.touch(now + Duration::from_secs(2));

        assert_eq!(entry.timer(ExpiryKind::Lifetime).deadline(), lifetime);
        assert_eq!(
            entry.timer(ExpiryKind::Idle).deadline(),
            now + Duration::from_secs(2)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_both() {
        let now = Instant::now();
        let mut entry = entry_at(now, 3, 1);
        let later = now + Duration::from_secs(2);

        let previous = entry.overwrite(
            Arc::new("other".to_string()),
            later + Duration::from_secs(3),
            later + Duration::from_secs(1),
        );

        assert_eq!(*previous, "value");
        assert_eq!(*entry.value, "other");
        assert_eq!(entry.expired_by(later + Duration::from_millis(999)), None);
        assert_eq!(
            entry.timer(ExpiryKind::Idle).deadline(),
            later + Duration::from_secs(1)
        );
    }

    #[tokio::test]
    async fn test_retire_returns_value() {
        let entry = entry_at(Instant::now(), 3, 1);
        let value = entry.retire(ExpiryKind::Idle);
        assert_eq!(*value, "value");
    }
}
