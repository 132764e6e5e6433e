//! Experiment parameters.
//!
//! Defaults are the fixed constants of the reference run. The binary layers
//! optional `LRSC_*` environment overrides on top; there are no arguments
//! and no config file.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::affinity::PinConfig;
use crate::classify::Thresholds;
use crate::error::{ProbeError, Result};

/// Outer iterations each hammer runs.
pub const DEFAULT_ITERATIONS: u32 = 10_000_000;
/// Delay between spawning the workers and opening the gate.
pub const DEFAULT_WARMUP: Duration = Duration::from_secs(1);

/// How the final report is rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object.
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format `{other}` (expected text or json)")),
        }
    }
}

/// Cores for the two hammers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct WorkerPins {
    /// Core for the reservation hammer.
    pub reservation: usize,
    /// Core for the store hammer.
    pub store: usize,
}

impl WorkerPins {
    /// Pin config for the reservation hammer.
    pub fn reservation(&self) -> PinConfig {
        PinConfig::core(self.reservation)
    }

    /// Pin config for the store hammer.
    pub fn store(&self) -> PinConfig {
        PinConfig::core(self.store)
    }
}

/// Everything one experiment needs to know.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProbeConfig {
    /// Outer iteration budget per hammer.
    pub iterations: u32,
    /// Pause before the gate opens.
    #[serde(serialize_with = "ser_millis")]
    pub warmup: Duration,
    /// Classification band edges.
    pub thresholds: Thresholds,
    /// Run the store hammer. `false` measures the noise floor.
    pub store_hammer: bool,
    /// Optional CPU pinning for the workers.
    pub pins: Option<WorkerPins>,
    /// Report rendering.
    pub format: ReportFormat,
}

fn ser_millis<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_millis())
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            warmup: DEFAULT_WARMUP,
            thresholds: Thresholds::default(),
            store_hammer: true,
            pins: None,
            format: ReportFormat::Text,
        }
    }
}

impl ProbeConfig {
    /// Defaults overridden by any `LRSC_*` variables in the environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `LRSC_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(v) = lookup("LRSC_ITER") {
            cfg.iterations = parse("LRSC_ITER", &v)?;
        }
        if let Some(v) = lookup("LRSC_WARMUP_MS") {
            cfg.warmup = Duration::from_millis(parse("LRSC_WARMUP_MS", &v)?);
        }
        if let Some(v) = lookup("LRSC_WORD_BELOW") {
            cfg.thresholds.word_below = parse("LRSC_WORD_BELOW", &v)?;
        }
        if let Some(v) = lookup("LRSC_LINE_ABOVE") {
            cfg.thresholds.line_above = parse("LRSC_LINE_ABOVE", &v)?;
        }
        if let Some(v) = lookup("LRSC_BASELINE") {
            cfg.store_hammer = !parse_flag("LRSC_BASELINE", &v)?;
        }
        if let Some(v) = lookup("LRSC_PIN") {
            cfg.pins = Some(parse_pins(&v)?);
        }
        if let Some(v) = lookup("LRSC_FORMAT") {
            cfg.format = v
                .parse()
                .map_err(|reason: String| ProbeError::invalid("LRSC_FORMAT", v.as_str(), reason))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject budgets and thresholds that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(ProbeError::invalid("iterations", "0", "must be at least 1"));
        }
        self.thresholds.validate()?;
        if let Some(p) = self.pins {
            if p.reservation == p.store {
                return Err(ProbeError::invalid(
                    "LRSC_PIN",
                    format!("{},{}", p.reservation, p.store),
                    "hammers must run on different cores",
                ));
            }
        }
        Ok(())
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ProbeError::invalid(key, raw, e.to_string()))
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ProbeError::invalid(key, raw, "expected a boolean")),
    }
}

fn parse_pins(raw: &str) -> Result<WorkerPins> {
    let (a, b) = raw
        .split_once(',')
        .ok_or_else(|| ProbeError::invalid("LRSC_PIN", raw, "expected `<lr_core>,<store_core>`"))?;
    Ok(WorkerPins {
        reservation: parse("LRSC_PIN", a)?,
        store: parse("LRSC_PIN", b)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn empty_environment_gives_reference_run() {
        let cfg = ProbeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ProbeConfig::default());
        assert_eq!(cfg.iterations, 10_000_000);
        assert_eq!(cfg.warmup, Duration::from_secs(1));
        assert_eq!(cfg.thresholds, Thresholds::new(0.01, 0.10).unwrap());
        assert!(cfg.store_hammer);
        assert_eq!(cfg.pins, None);
    }

    #[test]
    fn overrides_apply() {
        let cfg = ProbeConfig::from_lookup(lookup(&[
            ("LRSC_ITER", "2000"),
            ("LRSC_WARMUP_MS", "5"),
            ("LRSC_WORD_BELOW", "0.02"),
            ("LRSC_LINE_ABOVE", "0.2"),
            ("LRSC_BASELINE", "yes"),
            ("LRSC_PIN", "2, 3"),
            ("LRSC_FORMAT", "JSON"),
        ]))
        .unwrap();
        assert_eq!(cfg.iterations, 2000);
        assert_eq!(cfg.warmup, Duration::from_millis(5));
        assert_eq!(cfg.thresholds.word_below, 0.02);
        assert_eq!(cfg.thresholds.line_above, 0.2);
        assert!(!cfg.store_hammer);
        assert_eq!(
            cfg.pins,
            Some(WorkerPins {
                reservation: 2,
                store: 3
            })
        );
        assert_eq!(cfg.format, ReportFormat::Json);
    }

    #[test]
    fn garbage_is_rejected_with_its_key() {
        let err = ProbeConfig::from_lookup(lookup(&[("LRSC_ITER", "lots")])).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfig { key: "LRSC_ITER", .. }));

        let err = ProbeConfig::from_lookup(lookup(&[("LRSC_PIN", "4")])).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfig { key: "LRSC_PIN", .. }));

        let err = ProbeConfig::from_lookup(lookup(&[("LRSC_FORMAT", "xml")])).unwrap_err();
        assert!(matches!(err, ProbeError::InvalidConfig { key: "LRSC_FORMAT", .. }));
    }

    #[test]
    fn zero_budget_and_shared_core_are_invalid() {
        assert!(ProbeConfig::from_lookup(lookup(&[("LRSC_ITER", "0")])).is_err());
        assert!(ProbeConfig::from_lookup(lookup(&[("LRSC_PIN", "1,1")])).is_err());
        assert!(ProbeConfig::from_lookup(lookup(&[("LRSC_WORD_BELOW", "0.5")])).is_err());
    }
}
