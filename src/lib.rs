#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(missing_docs)]

//! LR/SC reservation granularity probe: races a load-reserved/store-conditional
//! increment against plain stores 32 bytes away on the same cache line and
//! classifies the reservation as word-sized or line-sized from how often the
//! conditional store fails. Spin-only synchronization, no locks near the
//! probed line, one bulk counter add per worker.

mod affinity;
mod classify;
mod config;
mod context;
mod counters;
mod error;
mod experiment;
mod gate;
mod hammer;
mod layout;
mod report;
mod reservation;

pub use affinity::{PinConfig, pin_current_thread};
pub use classify::{DEFAULT_LINE_ABOVE, DEFAULT_WORD_BELOW, Thresholds, Verdict, classify, failure_ratio};
pub use config::{DEFAULT_ITERATIONS, DEFAULT_WARMUP, ProbeConfig, ReportFormat, WorkerPins};
pub use context::ProbeContext;
pub use counters::RunCounters;
pub use error::{ProbeError, Result};
pub use experiment::{Experiment, probe};
pub use gate::Gate;
pub use hammer::{HammerOutcome, reservation_hammer, store_hammer};
pub use layout::{CACHELINE, ProbeRegion, VICTIM_OFFSET};
pub use report::{Addresses, ProbeReport, Results};
pub use reservation::{Hardware, Reservation};

/// Common imports for driving the probe.
pub mod prelude {
    pub use crate::classify::{Thresholds, Verdict, classify, failure_ratio};
    pub use crate::config::ProbeConfig;
    pub use crate::context::ProbeContext;
    pub use crate::error::ProbeError;
    pub use crate::experiment::Experiment;
    pub use crate::gate::Gate;
    pub use crate::hammer::{HammerOutcome, reservation_hammer, store_hammer};
    pub use crate::report::ProbeReport;
    pub use crate::reservation::{Hardware, Reservation};
}
