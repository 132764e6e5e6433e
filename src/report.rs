//! Final report: addresses, tallies, verdict.

use core::fmt;
use std::io::Write;

use serde::Serialize;

use crate::classify::{Thresholds, Verdict};
use crate::config::ReportFormat;
use crate::error::Result;
use crate::layout::ProbeRegion;

/// Where the probed cells ended up in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Addresses {
    /// Address of the reservation target.
    pub target: usize,
    /// Address of the victim cell.
    pub victim: usize,
    /// `victim - target` in bytes.
    pub victim_offset: usize,
}

impl Addresses {
    /// Read the addresses of `region`.
    pub fn of(region: &ProbeRegion) -> Self {
        Self {
            target: region.target_addr(),
            victim: region.victim_addr(),
            victim_offset: region.victim_offset(),
        }
    }
}

impl fmt::Display for Addresses {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "target: {:#x}", self.target)?;
        writeln!(f, "victim: {:#x} (+{} bytes)", self.victim, self.victim_offset)
    }
}

/// Everything one run measured.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProbeReport {
    /// Probed cell addresses.
    pub addresses: Addresses,
    /// Reservation primitive used.
    pub primitive: &'static str,
    /// Iteration budget `N`.
    pub iterations: u32,
    /// Outer iterations the reservation hammer finished.
    pub completed: u64,
    /// Conditional stores that failed and were retried.
    pub reservation_failures: u64,
    /// Victim stores completed.
    pub store_count: u64,
    /// Target cell value after both workers joined.
    pub final_target: u32,
    /// `reservation_failures / iterations`.
    pub failure_ratio: f64,
    /// Band edges used.
    pub thresholds: Thresholds,
    /// Classification of `failure_ratio`.
    pub verdict: Verdict,
    /// Store hammer was disabled for a noise-floor run.
    pub baseline: bool,
}

impl ProbeReport {
    /// Failure ratio as a percentage.
    pub fn failure_percent(&self) -> f64 {
        100.0 * self.failure_ratio
    }

    /// Everything after the address lines.
    pub fn results(&self) -> Results<'_> {
        Results(self)
    }

    /// Write the post-race part of the report in `format`.
    ///
    /// Text output assumes the address lines were already written before the
    /// race; JSON output is one self-contained object.
    pub fn write_to(&self, out: &mut dyn Write, format: ReportFormat) -> Result<()> {
        match format {
            ReportFormat::Text => write!(out, "{}", self.results())?,
            ReportFormat::Json => {
                serde_json::to_writer_pretty(&mut *out, self)?;
                writeln!(out)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Post-race text block of a [`ProbeReport`].
pub struct Results<'a>(&'a ProbeReport);

impl fmt::Display for Results<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f)?;
        writeln!(
            f,
            "SC fails: {} / {} ({:.4}%)",
            r.reservation_failures,
            r.iterations,
            r.failure_percent()
        )?;
        writeln!(f, "stores:   {}", r.store_count)?;
        writeln!(f, "final:    {}", r.final_target)?;
        writeln!(f)?;
        if r.baseline {
            writeln!(f, "(baseline run, store hammer disabled)")?;
        }
        writeln!(f, "→ {}", r.verdict)
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.addresses, self.results())
    }
}
