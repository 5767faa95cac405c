//! Integration tests for the scheduler → runner → service loop.
//!
//! Drives the same job table the firmware uses with a simulated clock and
//! checks acquisition cadence and the interplay with connectivity.

use healthmon::adapters::wifi::{ConnectivityPort, WifiAdapter};
use healthmon::app::runner::MonitorRunner;
use healthmon::app::service::MonitorService;
use healthmon::config::SystemConfig;
use healthmon::risk::RiskLevel;
use healthmon::scheduler::Scheduler;

use crate::mock_hw::{
    LogSink, MockClock, MockHardware, MockNet, MockPredictor, RecordingDisplay, sample,
};

type Runner<C> =
    MonitorRunner<MockHardware, MockPredictor, C, RecordingDisplay, LogSink, MockClock>;

fn runner<C: ConnectivityPort>(net: C, predictor: MockPredictor) -> (Runner<C>, Scheduler) {
    runner_on(MockClock::new(), net, predictor)
}

fn runner_on<C: ConnectivityPort>(
    clock: MockClock,
    net: C,
    predictor: MockPredictor,
) -> (Runner<C>, Scheduler) {
    let config = SystemConfig::default();
    let sched = Scheduler::with_monitor_jobs(
        config.timing.poll_interval_ms,
        config.timing.connectivity_check_interval_ms,
    );
    let svc = MonitorService::new(config, "HM-LOOP01");
    let r = MonitorRunner::new(
        svc,
        MockHardware::new(sample(0.3, 22.0, 98, true)),
        predictor,
        net,
        RecordingDisplay::default(),
        LogSink::new(),
        clock,
    );
    (r, sched)
}

/// Poll once at `now_ms`.
fn at<C: ConnectivityPort>(r: &mut Runner<C>, sched: &mut Scheduler, now_ms: u64) {
    r.clock.set(now_ms);
    r.poll(sched);
}

/// Poll every `step_ms` over `[from, to]` inclusive.
fn run<C: ConnectivityPort>(r: &mut Runner<C>, sched: &mut Scheduler, from: u64, to: u64, step_ms: u64) {
    let mut t = from;
    while t <= to {
        at(r, sched, t);
        t += step_ms;
    }
}

#[test]
fn acquires_immediately_then_every_poll_interval() {
    let (mut r, mut sched) = runner(MockNet::up(), MockPredictor::level("Low"));
    r.start();

    run(&mut r, &mut sched, 0, 32_000, 1_000);

    // t = 0, 4 000, ..., 32 000
    assert_eq!(r.service.cycle_count(), 9);
    assert_eq!(r.sink.cycles(), 9);
    assert_eq!(r.display.frames.len(), 9);
}

#[test]
fn connectivity_check_runs_every_thirty_seconds() {
    let (mut r, mut sched) = runner(MockNet::up(), MockPredictor::level("Low"));
    r.start();

    run(&mut r, &mut sched, 0, 61_000, 1_000);

    assert_eq!(r.net.polls, vec![30_000, 60_000]);
}

#[test]
fn connectivity_check_sees_time_spent_in_the_cycle_before_it() {
    let clock = MockClock::new();
    let predictor = MockPredictor::level("Low").with_latency(&clock, 0);
    let (mut r, mut sched) = runner_on(clock, MockNet::up(), predictor);
    r.start();

    // Acquisition lands on 0, 6 000, ..., 24 000.
    run(&mut r, &mut sched, 0, 24_000, 6_000);
    assert!(r.net.polls.is_empty());

    // At 30 000 both jobs are due; the acquisition blocks for 1.5 s first.
    r.predictor.set_latency_ms(1_500);
    at(&mut r, &mut sched, 30_000);
    assert_eq!(r.net.polls, vec![31_500]);
}

#[test]
fn idle_time_counts_down_to_the_next_acquisition() {
    let (mut r, mut sched) = runner(MockNet::up(), MockPredictor::level("Low"));
    r.start();
    assert_eq!(r.idle_for(&sched), Some(0));

    at(&mut r, &mut sched, 0);
    r.clock.set(1_000);
    assert_eq!(r.idle_for(&sched), Some(3_000));
}

#[test]
fn late_poll_fires_once_without_catch_up() {
    let (mut r, mut sched) = runner(MockNet::up(), MockPredictor::level("Low"));
    r.start();

    at(&mut r, &mut sched, 0);
    // A stall spanning three periods yields a single cycle.
    at(&mut r, &mut sched, 12_500);
    assert_eq!(r.service.cycle_count(), 2);

    at(&mut r, &mut sched, 16_000);
    assert_eq!(r.service.cycle_count(), 2, "cadence re-anchors on the late fire");
    at(&mut r, &mut sched, 16_500);
    assert_eq!(r.service.cycle_count(), 3);
}

#[test]
fn start_drives_normal_outputs_even_when_offline() {
    let (mut r, _sched) = runner(MockNet::down(), MockPredictor::level("High"));
    r.start();

    assert_eq!(r.net.connects, 1);
    assert!(r.hw.safe_on());
    assert!(!r.hw.alarm_on());
    assert_eq!(r.service.level(), RiskLevel::Normal);
}

#[test]
fn offline_loop_relies_on_local_rules() {
    let (mut r, mut sched) = runner(MockNet::down(), MockPredictor::level("High"));
    r.start();
    r.hw.sample = sample(0.9, 22.0, 98, true);

    run(&mut r, &mut sched, 0, 8_000, 4_000);

    assert!(r.predictor.sent.is_empty());
    assert_eq!(r.service.level(), RiskLevel::Warning);
    assert_eq!(r.hw.pulse_count(), 3);
}

#[test]
fn link_loss_suspends_remote_until_reconnect() {
    let mut wifi = WifiAdapter::new();
    wifi.set_credentials("ClinicNet", "password123").unwrap();
    let (mut r, mut sched) = runner(wifi, MockPredictor::level("Low"));
    r.start();
    assert!(r.net.is_connected());

    at(&mut r, &mut sched, 0);
    assert_eq!(r.predictor.sent.len(), 1);

    r.net.sim_drop_link();
    run(&mut r, &mut sched, 1_000, 59_000, 1_000);
    assert_eq!(r.predictor.sent.len(), 1, "no requests while the link is down");

    // First maintenance pass (30 s) notices the loss, the next retries.
    at(&mut r, &mut sched, 60_000);
    assert!(r.net.is_connected());

    at(&mut r, &mut sched, 64_000);
    assert_eq!(r.predictor.sent.len(), 2);
}
