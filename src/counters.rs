//! Run-wide tallies, each fed by exactly one worker with a single bulk add.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::layout::Padded;

/// Outcome counters accumulated over one experiment.
///
/// Each counter lives on its own cache line and is written by one worker,
/// once, after its loop has finished.
pub struct RunCounters {
    reservation_failures: Padded<AtomicU64>,
    store_count: Padded<AtomicU64>,
}

impl Default for RunCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl RunCounters {
    /// Zeroed counters.
    pub const fn new() -> Self {
        Self {
            reservation_failures: Padded::new(AtomicU64::new(0)),
            store_count: Padded::new(AtomicU64::new(0)),
        }
    }

    /// Fold a reservation hammer's local failure tally in.
    pub fn add_reservation_failures(&self, n: u64) {
        self.reservation_failures.fetch_add(n, Ordering::AcqRel);
    }

    /// Fold a store hammer's local store tally in.
    pub fn add_stores(&self, n: u64) {
        self.store_count.fetch_add(n, Ordering::AcqRel);
    }

    /// Conditional stores that had to be retried.
    pub fn reservation_failures(&self) -> u64 {
        self.reservation_failures.load(Ordering::Acquire)
    }

    /// Victim stores completed.
    pub fn store_count(&self) -> u64 {
        self.store_count.load(Ordering::Acquire)
    }
}

impl core::fmt::Debug for RunCounters {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RunCounters")
            .field("reservation_failures", &self.reservation_failures())
            .field("store_count", &self.store_count())
            .finish()
    }
}
