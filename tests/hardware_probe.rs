use std::time::Duration;

use lrsc_probe::prelude::*;

#[cfg(any(
    target_arch = "riscv64",
    target_arch = "riscv32",
    target_arch = "aarch64",
    target_arch = "arm"
))]
fn small(store_hammer: bool) -> ProbeConfig {
    ProbeConfig {
        iterations: 1_000_000,
        warmup: Duration::from_millis(50),
        store_hammer,
        ..ProbeConfig::default()
    }
}

#[test]
fn detect_agrees_with_build() {
    match Hardware::detect() {
        Ok(_) => assert!(Hardware::SUPPORTED),
        Err(e) => {
            assert!(!Hardware::SUPPORTED);
            assert!(matches!(e, ProbeError::UnsupportedPlatform { .. }));
        }
    }
}

#[cfg(any(
    target_arch = "riscv64",
    target_arch = "riscv32",
    target_arch = "aarch64",
    target_arch = "arm"
))]
#[test]
fn solo_reservation_has_a_low_noise_floor() {
    let hw = Hardware::detect().expect("native reservation pair");
    let mut out = Vec::new();
    let report = Experiment::new(small(false)).run(hw, &mut out).unwrap();
    assert_eq!(u64::from(report.final_target), report.completed);
    assert_eq!(report.verdict, Verdict::WordSized, "noise floor: {report}");
}

#[cfg(any(
    target_arch = "riscv64",
    target_arch = "riscv32",
    target_arch = "aarch64",
    target_arch = "arm"
))]
#[test]
fn raced_run_keeps_its_invariants() {
    let hw = Hardware::detect().expect("native reservation pair");
    let mut out = Vec::new();
    let report = Experiment::new(small(true)).run(hw, &mut out).unwrap();
    assert_eq!(report.completed, 1_000_000);
    assert_eq!(u64::from(report.final_target), report.completed);
    assert!(report.store_count <= 1_000_000);
}
