//! Shared state handed to both hammers at spawn time.

use crate::counters::RunCounters;
use crate::gate::Gate;
use crate::layout::{Padded, ProbeRegion};

/// Probe region, gate, and counters for one experiment.
///
/// The region leads the struct so it starts on a line boundary; the gate and
/// counters each sit on lines of their own behind it.
#[repr(C)]
pub struct ProbeContext {
    region: ProbeRegion,
    gate: Padded<Gate>,
    counters: RunCounters,
}

impl Default for ProbeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeContext {
    /// Fresh context: zeroed cells, closed gate, zero counters.
    pub const fn new() -> Self {
        Self {
            region: ProbeRegion::new(),
            gate: Padded::new(Gate::new()),
            counters: RunCounters::new(),
        }
    }

    /// The probed cache line.
    #[inline]
    pub fn region(&self) -> &ProbeRegion {
        &self.region
    }

    /// Start/stop flags.
    #[inline]
    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    /// Accumulated tallies.
    #[inline]
    pub fn counters(&self) -> &RunCounters {
        &self.counters
    }
}

impl core::fmt::Debug for ProbeContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProbeContext")
            .field("target", &format_args!("{:#x}", self.region.target_addr()))
            .field("gate", &*self.gate)
            .field("counters", &self.counters)
            .finish()
    }
}
