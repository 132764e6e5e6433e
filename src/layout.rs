//! Probe layout: one cache line holding the reservation target and the victim.
//!
//! The region is exactly one line wide and line aligned, so whether `target`
//! and `victim` share a reservation granule depends only on the granule size
//! of the hardware under test, never on neighbouring data.

use core::mem::{align_of, offset_of, size_of};
use core::sync::atomic::{AtomicU32, Ordering};

/// Cache line size the experiment probes for.
pub const CACHELINE: usize = 64;

/// Byte distance from `target` to `victim`.
pub const VICTIM_OFFSET: usize = 32;

const WORD: usize = size_of::<u32>();

/// Line-aligned block containing the reservation target and the victim cell.
#[repr(C, align(64))]
pub struct ProbeRegion {
    target: AtomicU32,
    _pad1: [u8; VICTIM_OFFSET - WORD],
    victim: AtomicU32,
    _pad2: [u8; CACHELINE - VICTIM_OFFSET - WORD],
}

const _: () = {
    assert!(size_of::<ProbeRegion>() == CACHELINE);
    assert!(align_of::<ProbeRegion>() == CACHELINE);
    assert!(offset_of!(ProbeRegion, victim) - offset_of!(ProbeRegion, target) == VICTIM_OFFSET);
};

impl ProbeRegion {
    /// A zeroed region.
    pub const fn new() -> Self {
        Self {
            target: AtomicU32::new(0),
            _pad1: [0; VICTIM_OFFSET - WORD],
            victim: AtomicU32::new(0),
            _pad2: [0; CACHELINE - VICTIM_OFFSET - WORD],
        }
    }

    /// The cell the reservation hammer increments.
    #[inline]
    pub fn target(&self) -> &AtomicU32 {
        &self.target
    }

    /// The cell the store hammer overwrites.
    #[inline]
    pub fn victim(&self) -> &AtomicU32 {
        &self.victim
    }

    /// Address of the target cell.
    pub fn target_addr(&self) -> usize {
        self.target.as_ptr() as usize
    }

    /// Address of the victim cell.
    pub fn victim_addr(&self) -> usize {
        self.victim.as_ptr() as usize
    }

    /// Distance in bytes from the target cell to the victim cell.
    pub fn victim_offset(&self) -> usize {
        self.victim_addr() - self.target_addr()
    }

    /// Current value of the target cell.
    pub fn final_target(&self) -> u32 {
        self.target.load(Ordering::Acquire)
    }
}

impl Default for ProbeRegion {
    fn default() -> Self {
        Self::new()
    }
}

/// Pads `T` out to its own cache line so bookkeeping never shares the probed line.
#[repr(C, align(64))]
pub(crate) struct Padded<T> {
    pub(crate) val: T,
}

impl<T> Padded<T> {
    pub(crate) const fn new(val: T) -> Self {
        Self { val }
    }
}

impl<T> core::ops::Deref for Padded<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.val
    }
}
