//! Maps an observed conditional-store failure rate to a granularity verdict.
//!
//! The default cut-offs (1% and 10%) are empirical. Coherence noise floors
//! differ between parts, so they are carried as [`Thresholds`] rather than
//! baked into [`classify`]'s callers.

use core::fmt;

use serde::Serialize;

use crate::error::{ProbeError, Result};

/// Ratios below this suggest a word-sized reservation.
pub const DEFAULT_WORD_BELOW: f64 = 0.01;
/// Ratios above this suggest a cache-line reservation.
pub const DEFAULT_LINE_ABOVE: f64 = 0.10;

/// What the failure rate says about the reservation granule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Victim stores essentially never broke the reservation.
    WordSized,
    /// Victim stores broke the reservation often enough to imply a shared granule.
    CacheLine,
    /// Between the two bands.
    Inconclusive,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::WordSized => "Word-sized reservation (~4B)",
            Verdict::CacheLine => "Cache-line reservation (~64B)",
            Verdict::Inconclusive => "Inconclusive",
        })
    }
}

/// Band edges for [`Thresholds::classify`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Thresholds {
    /// Strictly below: word-sized.
    pub word_below: f64,
    /// Strictly above: cache line.
    pub line_above: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            word_below: DEFAULT_WORD_BELOW,
            line_above: DEFAULT_LINE_ABOVE,
        }
    }
}

impl Thresholds {
    /// Build and validate a pair of band edges.
    pub fn new(word_below: f64, line_above: f64) -> Result<Self> {
        let t = Self {
            word_below,
            line_above,
        };
        t.validate()?;
        Ok(t)
    }

    /// Both edges must be finite ratios in `[0, 1]`, and the word band must
    /// not overlap the cache-line band.
    pub fn validate(&self) -> Result<()> {
        for (key, v) in [
            ("word_below", self.word_below),
            ("line_above", self.line_above),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(ProbeError::invalid(key, v.to_string(), "must be a ratio in [0, 1]"));
            }
        }
        if self.word_below > self.line_above {
            return Err(ProbeError::invalid(
                "word_below",
                self.word_below.to_string(),
                format!("must not exceed line_above ({})", self.line_above),
            ));
        }
        Ok(())
    }

    /// Place `ratio` in one of the three bands.
    ///
    /// `[0, word_below)` is word-sized, `(line_above, ..]` is cache line, and
    /// the closed interval between them is inconclusive.
    #[inline]
    pub fn classify(&self, ratio: f64) -> Verdict {
        if ratio < self.word_below {
            Verdict::WordSized
        } else if ratio > self.line_above {
            Verdict::CacheLine
        } else {
            Verdict::Inconclusive
        }
    }
}

/// Classify with the default thresholds.
#[inline]
pub fn classify(ratio: f64) -> Verdict {
    Thresholds::default().classify(ratio)
}

/// Failures per scheduled iteration. Zero iterations yields zero.
#[inline]
pub fn failure_ratio(failures: u64, iterations: u64) -> f64 {
    if iterations == 0 {
        return 0.0;
    }
    failures as f64 / iterations as f64
}
