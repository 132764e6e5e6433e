//! Start barrier and cooperative stop signal for the two hammers.
//!
//! Both flags are written once by the orchestrating thread and polled by the
//! workers. Waiting is a tight spin: no parking, no yielding, no lock words
//! that could add traffic near the probed line.

use core::sync::atomic::{AtomicBool, Ordering};

/// Start/stop flags shared between the orchestrator and the workers.
#[derive(Debug, Default)]
pub struct Gate {
    started: AtomicBool,
    stopping: AtomicBool,
}

impl Gate {
    /// A closed gate with no stop requested.
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
            stopping: AtomicBool::new(false),
        }
    }

    /// Spin until [`Gate::open`] has been called.
    #[inline]
    pub fn wait_for_start(&self) {
        while !self.started.load(Ordering::Acquire) {
            core::hint::spin_loop();
        }
    }

    /// Release every worker spinning in [`Gate::wait_for_start`].
    pub fn open(&self) {
        self.started.store(true, Ordering::Release);
    }

    /// Ask workers to leave their loops at the next iteration boundary.
    ///
    /// Does not block and does not wait for the workers to notice.
    pub fn request_stop(&self) {
        self.stopping.store(true, Ordering::Relaxed);
    }

    /// Whether a stop has been requested.
    #[inline(always)]
    pub fn should_stop(&self) -> bool {
        self.stopping.load(Ordering::Relaxed)
    }

    /// Whether the gate has been opened.
    pub fn is_open(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}
