//! Orchestration of one measurement: spawn, warm up, race, join, classify.

use std::io::Write;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::affinity::{PinConfig, pin_current_thread};
use crate::classify::failure_ratio;
use crate::config::{ProbeConfig, ReportFormat};
use crate::context::ProbeContext;
use crate::error::{ProbeError, Result};
use crate::hammer::{HammerOutcome, reservation_hammer, store_hammer};
use crate::report::{Addresses, ProbeReport};
use crate::reservation::{Hardware, Reservation};

/// One configured run of the probe.
#[derive(Clone, Copy, Debug, Default)]
pub struct Experiment {
    config: ProbeConfig,
}

impl Experiment {
    /// Experiment with the given parameters.
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    /// Parameters of this experiment.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Race `reservation` against the store hammer and classify the result.
    ///
    /// In text mode the address lines are written to `out` before the
    /// workers start. The stop flag is raised only after the reservation
    /// hammer has joined; its own budget ends the measurement window.
    pub fn run<R>(&self, reservation: R, out: &mut dyn Write) -> Result<ProbeReport>
    where
        R: Reservation + 'static,
    {
        let cfg = self.config;
        cfg.validate()?;

        let ctx = Arc::new(ProbeContext::new());
        let addresses = Addresses::of(ctx.region());
        if cfg.format == ReportFormat::Text {
            write!(out, "{addresses}")?;
            out.flush()?;
        }

        let primitive = reservation.name();
        info!(
            primitive,
            iterations = cfg.iterations,
            baseline = !cfg.store_hammer,
            target_addr = format_args!("{:#x}", addresses.target),
            victim_offset = addresses.victim_offset,
            "starting probe"
        );

        let iterations = cfg.iterations;
        let lr = {
            let ctx = Arc::clone(&ctx);
            let mut reservation = reservation;
            spawn_worker("lrsc-hammer", cfg.pins.map(|p| p.reservation()), move || {
                reservation_hammer(&ctx, &mut reservation, iterations)
            })?
        };

        let store = if cfg.store_hammer {
            let worker_ctx = Arc::clone(&ctx);
            let spawned = spawn_worker("store-hammer", cfg.pins.map(|p| p.store()), move || {
                store_hammer(&worker_ctx, iterations)
            });
            match spawned {
                Ok(h) => Some(h),
                Err(e) => {
                    release_worker(&ctx, lr, "reservation");
                    return Err(e);
                }
            }
        } else {
            None
        };

        thread::sleep(cfg.warmup);
        debug!(warmup_ms = cfg.warmup.as_millis() as u64, "opening gate");
        ctx.gate().open();

        let lr_joined = join_worker(lr, "reservation");
        ctx.gate().request_stop();
        let store_joined = match store {
            Some(h) => join_worker(h, "store"),
            None => Ok(HammerOutcome::default()),
        };
        let lr_out = lr_joined?;
        let store_out = store_joined?;

        let counters = ctx.counters();
        let failures = counters.reservation_failures();
        let stores = counters.store_count();
        debug_assert_eq!(failures, lr_out.tally);
        debug_assert_eq!(stores, store_out.tally);
        if cfg.store_hammer && stores < u64::from(iterations) {
            debug!(stores, "store hammer stopped early");
        }

        let ratio = failure_ratio(failures, u64::from(iterations));
        let verdict = cfg.thresholds.classify(ratio);
        let report = ProbeReport {
            addresses,
            primitive,
            iterations,
            completed: lr_out.completed,
            reservation_failures: failures,
            store_count: stores,
            final_target: ctx.region().final_target(),
            failure_ratio: ratio,
            thresholds: cfg.thresholds,
            verdict,
            baseline: !cfg.store_hammer,
        };
        info!(failures, stores, ratio, %verdict, "probe finished");

        report.write_to(out, cfg.format)?;
        Ok(report)
    }
}

/// Run the experiment on the native reservation instructions.
///
/// Fails with [`ProbeError::UnsupportedPlatform`] where there are none.
pub fn probe(config: ProbeConfig, out: &mut dyn Write) -> Result<ProbeReport> {
    let hw = Hardware::detect()?;
    Experiment::new(config).run(hw, out)
}

fn spawn_worker<F>(
    name: &'static str,
    pin: Option<PinConfig>,
    f: F,
) -> Result<JoinHandle<HammerOutcome>>
where
    F: FnOnce() -> HammerOutcome + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            if let Some(cfg) = pin {
                if !pin_current_thread(&cfg) {
                    warn!(worker = name, ?cfg, "running unpinned");
                }
            }
            f()
        })
        .map_err(ProbeError::Spawn)?;
    debug!(worker = name, "spawned");
    Ok(handle)
}

/// Let a worker that will never race fall through its loop, then reap it.
///
/// Returns `false` if the worker panicked.
fn release_worker(
    ctx: &ProbeContext,
    handle: JoinHandle<HammerOutcome>,
    worker: &'static str,
) -> bool {
    ctx.gate().request_stop();
    ctx.gate().open();
    match handle.join() {
        Ok(_) => true,
        Err(_) => {
            warn!(worker, "worker panicked while being released");
            false
        }
    }
}

fn join_worker(handle: JoinHandle<HammerOutcome>, worker: &'static str) -> Result<HammerOutcome> {
    let out = handle
        .join()
        .map_err(|_| ProbeError::WorkerPanicked { worker })?;
    debug!(worker, completed = out.completed, tally = out.tally, "joined");
    Ok(out)
}
