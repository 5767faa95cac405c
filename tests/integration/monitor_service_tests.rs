//! Integration tests for the MonitorService → fusion → alert pipeline.
//!
//! Each test drives full acquisition cycles through mock adapters and
//! asserts on the alert outputs, the display and the emitted events.

use std::time::Duration;

use healthmon::app::events::AppEvent;
use healthmon::app::ports::{ClockPort, PredictionError};
use healthmon::app::service::MonitorService;
use healthmon::config::SystemConfig;
use healthmon::risk::RiskLevel;
use healthmon::risk::remote::RemoteOutcome;
use healthmon::sensors::SensorSample;

use crate::mock_hw::{
    AlertCall, LogSink, MockClock, MockHardware, MockPredictor, RecordingDisplay, response, sample,
};

struct Rig {
    clock: MockClock,
    svc: MonitorService,
    hw: MockHardware,
    predictor: MockPredictor,
    display: RecordingDisplay,
    sink: LogSink,
}

impl Rig {
    fn new(s: SensorSample, predictor: MockPredictor) -> Self {
        Self::with_clock(MockClock::new(), s, predictor)
    }

    fn with_clock(clock: MockClock, s: SensorSample, predictor: MockPredictor) -> Self {
        let mut svc = MonitorService::new(SystemConfig::default(), "HM-TEST01");
        let mut hw = MockHardware::new(s);
        let mut sink = LogSink::new();
        svc.start(&mut hw, &mut sink);
        Self {
            clock,
            svc,
            hw,
            predictor,
            display: RecordingDisplay::default(),
            sink,
        }
    }

    /// Run one cycle starting at `now_ms` (never moving the clock back).
    fn cycle(&mut self, now_ms: u64, connected: bool) -> RiskLevel {
        self.clock.set(now_ms.max(self.clock.uptime_ms()));
        self.svc
            .run_cycle(
                &self.clock,
                &mut self.hw,
                &mut self.predictor,
                connected,
                &mut self.display,
                &mut self.sink,
            )
            .fused
    }
}

// ── Reference scenarios ───────────────────────────────────────

#[test]
fn bad_air_is_critical_with_continuous_alarm() {
    let mut rig = Rig::new(sample(1.2, 20.0, 98, true), MockPredictor::level("Low"));

    assert_eq!(rig.cycle(4_000, true), RiskLevel::Critical);
    let fusion = rig.svc.last_fusion().unwrap();
    assert_eq!(fusion.local, RiskLevel::Critical);
    assert_eq!(fusion.remote, RiskLevel::Normal);

    assert!(rig.hw.alarm_on(), "alarm must be held on");
    assert!(rig.hw.problem_on());
    assert!(!rig.hw.safe_on());
    assert_eq!(rig.hw.pulse_count(), 0);

    // Stays on across cycles.
    rig.cycle(8_000, true);
    assert!(rig.hw.alarm_on());
}

#[test]
fn cold_room_warns_with_pulsed_alarm() {
    let mut rig = Rig::new(sample(0.5, 16.0, 97, true), MockPredictor::level("Low"));

    assert_eq!(rig.cycle(4_000, true), RiskLevel::Warning);
    assert!(rig.hw.problem_on());
    assert!(!rig.hw.safe_on());
    assert_eq!(rig.hw.pulse_count(), 1, "entering Warning pulses at once");
    assert!(rig.hw.calls.contains(&AlertCall::Pulse(200)));
    assert!(!rig.hw.alarm_on(), "a pulse ends with the alarm off");
    assert_eq!(rig.svc.last_pulse_ms(), Some(4_000));

    // Every 4 s poll is past the 2 s cadence.
    rig.cycle(8_000, true);
    rig.cycle(12_000, true);
    assert_eq!(rig.hw.pulse_count(), 3);
    assert!(!rig.hw.calls.contains(&AlertCall::Alarm(true)));
}

#[test]
fn pulse_cadence_follows_time_after_a_slow_remote_call() {
    let clock = MockClock::new();
    let predictor = MockPredictor::level("Low").with_latency(&clock, 9_800);
    let mut rig = Rig::with_clock(clock, sample(0.5, 16.0, 97, true), predictor);

    // The request blocks for 9.8 s; the pulse happens when it returns.
    assert_eq!(rig.cycle(0, true), RiskLevel::Warning);
    assert_eq!(rig.clock.uptime_ms(), 9_800);
    assert_eq!(rig.svc.last_pulse_ms(), Some(9_800));
    assert_eq!(rig.hw.pulse_count(), 1);

    // The next cycle starts right away; no second pulse within 2 s.
    rig.predictor.set_latency_ms(0);
    assert_eq!(rig.cycle(9_800, true), RiskLevel::Warning);
    assert_eq!(rig.hw.pulse_count(), 1);
    assert_eq!(rig.svc.last_pulse_ms(), Some(9_800));

    rig.cycle(11_800, true);
    assert_eq!(rig.hw.pulse_count(), 2);
    assert_eq!(rig.svc.last_pulse_ms(), Some(11_800));
}

#[test]
fn remote_reply_after_the_deadline_is_dropped() {
    let clock = MockClock::new();
    let predictor = MockPredictor::level("High").with_latency(&clock, 10_500);
    let mut rig = Rig::with_clock(clock, sample(0.3, 22.0, 98, true), predictor);

    assert_eq!(rig.cycle(0, true), RiskLevel::Normal);
    let remote = rig.sink.events.iter().find_map(|e| match e {
        AppEvent::Cycle(t) => Some(t.remote),
        _ => None,
    });
    assert_eq!(remote, Some(RemoteOutcome::Failed(PredictionError::Timeout)));
    assert!(rig.hw.safe_on());
}

#[test]
fn no_finger_and_clean_air_is_normal() {
    let mut rig = Rig::new(sample(0.3, 22.0, 0, false), MockPredictor::level("Low"));

    assert_eq!(rig.cycle(4_000, true), RiskLevel::Normal);
    assert!(rig.hw.safe_on());
    assert!(!rig.hw.problem_on());
    assert!(!rig.hw.alarm_on());
    assert_eq!(rig.hw.pulse_count(), 0);
}

#[test]
fn remote_timeout_never_suppresses_local_warning() {
    let mut rig = Rig::new(
        sample(0.5, 16.0, 97, true),
        MockPredictor::always(Err(PredictionError::Timeout)),
    );

    assert_eq!(rig.cycle(4_000, true), RiskLevel::Warning);
    let fusion = rig.svc.last_fusion().unwrap();
    assert_eq!(fusion.remote, RiskLevel::Normal);

    let remote = rig.sink.events.iter().find_map(|e| match e {
        AppEvent::Cycle(t) => Some(t.remote),
        _ => None,
    });
    assert_eq!(remote, Some(RemoteOutcome::Failed(PredictionError::Timeout)));
}

#[test]
fn remote_high_escalates_normal_reading() {
    let mut rig = Rig::new(sample(0.3, 22.0, 98, true), MockPredictor::level("High"));

    assert_eq!(rig.cycle(4_000, true), RiskLevel::Critical);
    let fusion = rig.svc.last_fusion().unwrap();
    assert_eq!(fusion.local, RiskLevel::Normal);
    assert!(fusion.escalated_by_remote());
    assert!(rig.hw.alarm_on());
}

// ── Remote client behaviour ───────────────────────────────────

#[test]
fn offline_cycle_sends_nothing() {
    let mut rig = Rig::new(sample(0.3, 22.0, 98, true), MockPredictor::level("High"));

    assert_eq!(rig.cycle(4_000, false), RiskLevel::Normal);
    assert!(rig.predictor.sent.is_empty());
    assert_eq!(rig.svc.last_sent_ms(), None);
    assert_eq!(rig.display.frames[0].risk_score, None);
}

#[test]
fn request_carries_device_id_and_deadline() {
    let mut rig = Rig::new(sample(0.42, 22.0, 97, true), MockPredictor::level("Low"));
    rig.cycle(4_000, true);

    let sent = &rig.predictor.sent[0];
    assert_eq!(sent.device_id, "HM-TEST01");
    assert_eq!(sent.spo2, 97);
    assert!((sent.air_quality - 0.42).abs() < 1e-6);
    assert_eq!(sent.timeout, Duration::from_millis(10_000));
    assert_eq!(rig.svc.last_sent_ms(), Some(4_000));
}

#[test]
fn unknown_category_and_malformed_reply_count_as_normal() {
    let mut predictor = MockPredictor::always(Ok(response("Low", 0.1)));
    predictor.push(Ok(response("Elevated", 0.7)));
    predictor.push(Err(PredictionError::Malformed));
    predictor.push(Err(PredictionError::Status(500)));
    let mut rig = Rig::new(sample(0.3, 22.0, 98, true), predictor);

    for i in 1..=3 {
        assert_eq!(rig.cycle(i * 4_000, true), RiskLevel::Normal);
    }
    assert_eq!(rig.predictor.sent.len(), 3);
}

// ── Transitions and events ────────────────────────────────────

#[test]
fn recovery_from_critical_restores_safe_pattern() {
    let mut rig = Rig::new(sample(1.2, 20.0, 98, true), MockPredictor::level("Low"));
    rig.cycle(4_000, true);
    assert!(rig.hw.alarm_on());

    rig.hw.sample = sample(0.3, 22.0, 98, true);
    assert_eq!(rig.cycle(8_000, true), RiskLevel::Normal);
    assert!(rig.hw.safe_on());
    assert!(!rig.hw.problem_on());
    assert!(!rig.hw.alarm_on());
    assert_eq!(rig.svc.last_pulse_ms(), None);
}

#[test]
fn critical_to_warning_drops_the_held_alarm() {
    let mut rig = Rig::new(sample(1.2, 20.0, 98, true), MockPredictor::level("Low"));
    rig.cycle(4_000, true);

    rig.hw.sample = sample(0.9, 20.0, 98, true);
    rig.hw.clear();
    assert_eq!(rig.cycle(8_000, true), RiskLevel::Warning);
    assert_eq!(rig.hw.pulse_count(), 1);
    assert!(!rig.hw.alarm_on());
    assert!(rig.hw.problem_on());
}

#[test]
fn events_track_every_cycle_and_level_change() {
    let mut rig = Rig::new(sample(0.3, 22.0, 98, true), MockPredictor::level("Low"));
    assert!(matches!(rig.sink.events[0], AppEvent::Started(RiskLevel::Normal)));

    rig.cycle(4_000, true);
    rig.hw.sample = sample(1.5, 22.0, 98, true);
    rig.cycle(8_000, true);
    rig.cycle(12_000, true);
    rig.hw.sample = sample(0.3, 22.0, 98, true);
    rig.cycle(16_000, true);

    assert_eq!(rig.sink.cycles(), 4);
    assert_eq!(
        rig.sink.risk_changes(),
        vec![
            (RiskLevel::Normal, RiskLevel::Critical),
            (RiskLevel::Critical, RiskLevel::Normal),
        ]
    );
    assert_eq!(rig.svc.cycle_count(), 4);
}

#[test]
fn display_gets_fused_level_and_score() {
    let mut rig = Rig::new(
        sample(0.3, 22.0, 98, true),
        MockPredictor::always(Ok(response("Moderate", 0.55))),
    );
    rig.cycle(4_000, true);

    let frame = rig.display.frames[0];
    assert_eq!(frame.level, RiskLevel::Warning);
    assert_eq!(frame.risk_score, Some(0.55));
    assert_eq!(frame.spo2_pct, 98);
    assert!(frame.finger_present);
}
