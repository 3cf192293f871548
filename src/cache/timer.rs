//! Expiry Timer Module
//!
//! A timer is a deadline plus the waiter task sleeping towards it. Resetting a
//! timer only moves the deadline; the waiter notices on wake-up and sleeps
//! again, so a stale fire can never remove a refreshed entry.

use std::fmt;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Clamp for deadlines that would overflow the clock (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// == Expiry Kind ==
/// Which of an entry's two timers fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpiryKind {
    /// Maximum lifetime since insertion or last overwrite
    Lifetime,
    /// Maximum idle time since insertion, last overwrite or last read
    Idle,
}

impl ExpiryKind {
    /// The other timer of the same entry.
    pub fn sibling(self) -> Self {
        match self {
            ExpiryKind::Lifetime => ExpiryKind::Idle,
            ExpiryKind::Idle => ExpiryKind::Lifetime,
        }
    }
}

impl fmt::Display for ExpiryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpiryKind::Lifetime => f.write_str("lifetime"),
            ExpiryKind::Idle => f.write_str("idle"),
        }
    }
}

/// Returns `now + duration`, clamped instead of overflowing.
pub fn deadline_after(now: Instant, duration: Duration) -> Instant {
    now.checked_add(duration)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

// == Expiry Timer ==
/// One armed single-shot timer of an entry.
///
/// Dropping the timer stops its waiter.
pub struct ExpiryTimer {
    deadline: Instant,
    waiter: JoinHandle<()>,
}

impl ExpiryTimer {
    pub fn new(deadline: Instant, waiter: JoinHandle<()>) -> Self {
        Self { deadline, waiter }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Re-arms the timer. Must be called with the store lock held.
    pub fn reset(&mut self, deadline: Instant) {
        self.deadline = deadline;
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Stops the waiter. A waiter already blocked on the store lock finishes
    /// its current wake-up as a no-op.
    pub fn stop(&self) {
        self.waiter.abort();
    }
}

impl Drop for ExpiryTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for ExpiryTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryTimer")
            .field("deadline", &self.deadline)
            .field("finished", &self.waiter.is_finished())
            .finish()
    }
}
