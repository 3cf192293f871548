//! Cache Statistics Module
//!
//! Tracks lookups, writes and expirations.

use serde::Serialize;

use crate::cache::timer::ExpiryKind;

// == Cache Stats ==
/// Store activity counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful lookups
    pub hits: u64,
    /// Number of lookups for absent or expired identifiers
    pub misses: u64,
    /// Number of entries created
    pub inserts: u64,
    /// Number of puts that replaced a live entry
    pub overwrites: u64,
    /// Number of entries removed by the lifetime timer
    pub lifetime_expirations: u64,
    /// Number of entries removed by the idle timer
    pub idle_expirations: u64,
    /// Current number of entries in the store
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Expirations ==
    /// Total number of expired entries, whichever timer fired.
    pub fn expirations(&self) -> u64 {
        self.lifetime_expirations + self.idle_expirations
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Insert ==
    /// Increments the insert counter.
    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    // == Record Overwrite ==
    /// Increments the overwrite counter.
    pub fn record_overwrite(&mut self) {
        self.overwrites += 1;
    }

    // == Record Expiration ==
    /// Increments the counter of the timer that removed an entry.
    pub fn record_expiration(&mut self, kind: ExpiryKind) {
        match kind {
            ExpiryKind::Lifetime => self.lifetime_expirations += 1,
            ExpiryKind::Idle => self.idle_expirations += 1,
        }
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats, CacheStats::default());
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();

        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_expiration_by_kind() {
        let mut stats = CacheStats::new();
        stats.record_expiration(ExpiryKind::Lifetime);
        stats.record_expiration(ExpiryKind::Idle);
        stats.record_expiration(ExpiryKind::Idle);

        assert_eq!(stats.lifetime_expirations, 1);
        assert_eq!(stats.idle_expirations, 2);
        assert_eq!(stats.expirations(), 3);
    }

    #[test]
    fn test_stats_serialize() {
        let mut stats = CacheStats::new();
        stats.record_insert();
        stats.record_overwrite();
        stats.set_total_entries(1);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["inserts"], 1);
        assert_eq!(json["overwrites"], 1);
        assert_eq!(json["total_entries"], 1);
        assert_eq!(json["idle_expirations"], 0);
    }
}
