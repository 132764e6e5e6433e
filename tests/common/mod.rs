#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use lrsc_probe::prelude::*;

/// Software pair that refuses every `fail_every`-th conditional store.
///
/// Not a stand-in for hardware: it only lets the harness be driven with a
/// known failure pattern.
pub struct EveryNth {
    fail_every: u32,
    attempts: u32,
}

impl EveryNth {
    pub fn new(fail_every: u32) -> Self {
        Self {
            fail_every,
            attempts: 0,
        }
    }

    pub fn never_fails() -> Self {
        Self::new(0)
    }
}

impl Reservation for EveryNth {
    fn load_reserved(&mut self, cell: &AtomicU32) -> u32 {
        cell.load(Ordering::Relaxed)
    }

    fn store_conditional(&mut self, cell: &AtomicU32, value: u32) -> bool {
        self.attempts = self.attempts.wrapping_add(1);
        if self.fail_every != 0 && self.attempts % self.fail_every == 0 {
            return false;
        }
        cell.store(value, Ordering::Relaxed);
        true
    }

    fn name(&self) -> &'static str {
        "every-nth"
    }
}

pub fn quick(iterations: u32) -> ProbeConfig {
    ProbeConfig {
        iterations,
        warmup: Duration::from_millis(10),
        ..ProbeConfig::default()
    }
}
