//! Load-reserved/store-conditional capability.
//!
//! The hammer never touches inline assembly directly; it drives a
//! [`Reservation`] implementation. [`Hardware`] maps onto the target's native
//! reserve/conditional-store instructions and refuses to exist where there
//! are none, so a run can never silently measure a lock instead.

mod hardware;

use core::sync::atomic::AtomicU32;

pub use hardware::Hardware;

/// A reserve/conditional-store pair over a 32-bit cell.
///
/// Implementations are owned by one hammer thread for the whole run.
pub trait Reservation: Send {
    /// Read `cell` and take a reservation on its granule.
    fn load_reserved(&mut self, cell: &AtomicU32) -> u32;

    /// Write `value` to `cell` if the reservation taken by the preceding
    /// [`Reservation::load_reserved`] is still intact. Returns `true` on commit.
    fn store_conditional(&mut self, cell: &AtomicU32, value: u32) -> bool;

    /// Short label for logs and reports.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<R: Reservation + ?Sized> Reservation for Box<R> {
    #[inline(always)]
    fn load_reserved(&mut self, cell: &AtomicU32) -> u32 {
        (**self).load_reserved(cell)
    }

    #[inline(always)]
    fn store_conditional(&mut self, cell: &AtomicU32, value: u32) -> bool {
        (**self).store_conditional(cell, value)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
