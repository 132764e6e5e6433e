//! The two racing loops.
//!
//! Both spin on the gate, then run flat out with no yielding and no shared
//! bookkeeping inside the loop. Local tallies are folded into the shared
//! counters with one add at the end.

use core::sync::atomic::Ordering;

use serde::Serialize;

use crate::context::ProbeContext;
use crate::reservation::Reservation;

/// What one hammer did before it stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HammerOutcome {
    /// Outer iterations finished.
    pub completed: u64,
    /// Reservation hammer: conditional stores retried. Store hammer: stores issued.
    pub tally: u64,
}

/// Atomically increment the target cell `iterations` times through
/// load-reserved/store-conditional, counting every conditional store that
/// failed and had to be retried.
///
/// The stop flag is only checked between outer iterations; a retry storm on
/// one increment runs until that increment commits.
#[inline(never)]
pub fn reservation_hammer<R: Reservation + ?Sized>(
    ctx: &ProbeContext,
    res: &mut R,
    iterations: u32,
) -> HammerOutcome {
    let gate = ctx.gate();
    let target = ctx.region().target();
    gate.wait_for_start();

    let budget = u64::from(iterations);
    let mut failures: u64 = 0;
    let mut completed: u64 = 0;
    while completed < budget && !gate.should_stop() {
        loop {
            let old = res.load_reserved(target);
            if res.store_conditional(target, old.wrapping_add(1)) {
                break;
            }
            failures += 1;
        }
        completed += 1;
    }

    ctx.counters().add_reservation_failures(failures);
    HammerOutcome {
        completed,
        tally: failures,
    }
}

/// Overwrite the victim cell once per iteration with plain stores.
///
/// `Relaxed` stores lower to an ordinary store instruction; no reservation is
/// ever taken on the victim.
#[inline(never)]
pub fn store_hammer(ctx: &ProbeContext, iterations: u32) -> HammerOutcome {
    let gate = ctx.gate();
    let victim = ctx.region().victim();
    gate.wait_for_start();

    let mut stores: u64 = 0;
    for i in 0..iterations {
        if gate.should_stop() {
            break;
        }
        victim.store(i, Ordering::Relaxed);
        stores += 1;
    }

    ctx.counters().add_stores(stores);
    HammerOutcome {
        completed: stores,
        tally: stores,
    }
}
