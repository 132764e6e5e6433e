mod common;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::EveryNth;
use lrsc_probe::prelude::*;

#[test]
fn both_hammers_wait_for_the_gate() {
    let ctx = Arc::new(ProbeContext::new());
    let lr = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || reservation_hammer(&ctx, &mut EveryNth::new(3), 9_000))
    };
    let st = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || store_hammer(&ctx, 9_000))
    };

    thread::sleep(Duration::from_millis(30));
    assert_eq!(ctx.region().final_target(), 0);
    assert_eq!(ctx.counters().store_count(), 0);

    ctx.gate().open();
    let lr_out = lr.join().unwrap();
    ctx.gate().request_stop();
    let st_out = st.join().unwrap();

    assert_eq!(lr_out.completed, 9_000);
    assert_eq!(u64::from(ctx.region().final_target()), lr_out.completed);
    assert_eq!(ctx.counters().reservation_failures(), lr_out.tally);
    assert!(lr_out.tally <= lr_out.completed);
    assert_eq!(ctx.counters().store_count(), st_out.completed);
    assert!(st_out.completed <= 9_000);
}

#[test]
fn store_count_hits_budget_when_never_stopped() {
    let ctx = Arc::new(ProbeContext::new());
    let st = {
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || store_hammer(&ctx, 100_000))
    };
    ctx.gate().open();
    let out = st.join().unwrap();
    assert_eq!(out.completed, 100_000);
    assert_eq!(ctx.counters().store_count(), 100_000);
}

#[test]
fn classifier_scenarios() {
    const N: u64 = 10_000_000;
    assert_eq!(classify(failure_ratio(50, N)), Verdict::WordSized);
    assert_eq!(classify(failure_ratio(1_500_000, N)), Verdict::CacheLine);
    assert_eq!(classify(failure_ratio(500_000, N)), Verdict::Inconclusive);
}
