//! Monitor service — the hexagonal core.
//!
//! [`MonitorService`] owns the remote risk client, the alert actuator and
//! the per-cycle bookkeeping.  It exposes a clean, hardware-agnostic API.
//! All I/O flows through port traits injected at call sites, making the
//! entire service testable with mock adapters.
//!
//! ```text
//!    SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//! PredictionPort ◀─▶│      MonitorService       │ ──▶ DisplayPort
//!     AlertPort ◀── │ local · remote · fuse · FSM│
//!                   └──────────────────────────┘
//! ```

use log::info;

use crate::config::SystemConfig;
use crate::fsm::AlertActuator;
use crate::fsm::context::{AlarmDrive, AlertOutputs};
use crate::risk::local::evaluate_local;
use crate::risk::remote::RemoteRiskClient;
use crate::risk::{FusionResult, RiskLevel};

use super::events::{AppEvent, TelemetryData};
use super::ports::{
    AlertPort, ClockPort, DisplayFrame, DisplayPort, EventSink, PredictionPort, SensorPort,
};

// ───────────────────────────────────────────────────────────────
// MonitorService
// ───────────────────────────────────────────────────────────────

/// Runs acquisition cycles: sample → local + remote → fuse → actuate.
pub struct MonitorService {
    config: SystemConfig,
    remote: RemoteRiskClient,
    actuator: AlertActuator,
    cycle_count: u64,
    last_fusion: Option<FusionResult>,
    /// Uptime at which the last prediction request was attempted.
    last_sent_ms: Option<u64>,
}

impl MonitorService {
    /// Construct the service.  `device_id` is sent with every prediction
    /// request.
    pub fn new(config: SystemConfig, device_id: &str) -> Self {
        let remote = RemoteRiskClient::new(device_id, config.timing.remote_timeout_ms);
        let actuator = AlertActuator::new(config.alarm);
        Self {
            config,
            remote,
            actuator,
            cycle_count: 0,
            last_fusion: None,
            last_sent_ms: None,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the outputs to the Normal pattern and announce the start.
    pub fn start(&mut self, alerts: &mut impl AlertPort, sink: &mut impl EventSink) {
        apply_outputs(&AlertOutputs::normal(), alerts);
        sink.emit(&AppEvent::Started(self.actuator.level()));
        info!(
            "MonitorService started (device_id={}, poll={} ms)",
            self.remote.device_id(),
            self.config.timing.poll_interval_ms
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full acquisition cycle.
    ///
    /// `clock` is read at cycle start for telemetry and again right before
    /// actuation, so pulse timestamps reflect when the pulse is emitted
    /// rather than when a possibly slow remote call began.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`AlertPort`]; this avoids a double mutable borrow while keeping
    /// the port boundary explicit.  `connected` is the connectivity state
    /// sampled by the caller before the cycle starts.
    pub fn run_cycle(
        &mut self,
        clock: &impl ClockPort,
        hw: &mut (impl SensorPort + AlertPort),
        predictor: &mut impl PredictionPort,
        connected: bool,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
    ) -> FusionResult {
        self.cycle_count += 1;
        let prev_level = self.actuator.level();
        let started_ms = clock.uptime_ms();

        // 1. Acquire
        let sample = hw.read_sample();

        // 2. Local assessment
        let local = evaluate_local(
            sample.air_quality,
            sample.temperature_c,
            sample.spo2_pct,
            sample.finger_present,
            &self.config.thresholds,
        );

        // 3. Remote assessment (bounded, never fails)
        if connected {
            self.last_sent_ms = Some(started_ms);
        }
        let remote = self.remote.assess(&sample, connected, predictor, clock);

        // 4. Fuse
        let fusion = FusionResult::new(local.level, remote.level);
        info!(
            "cycle {}: local={} remote={} -> {}",
            self.cycle_count, fusion.local, fusion.remote, fusion.fused
        );

        // 5. Actuate
        let outputs = self.actuator.actuate(fusion.fused, clock.uptime_ms());
        apply_outputs(&outputs, hw);

        // 6. Display and telemetry
        display.render(&DisplayFrame::new(&sample, fusion.fused, remote.risk_score()));
        sink.emit(&AppEvent::Cycle(TelemetryData {
            cycle: self.cycle_count,
            sample,
            fusion,
            remote: remote.outcome,
            connected,
            uptime_ms: started_ms,
        }));
        if fusion.fused != prev_level {
            sink.emit(&AppEvent::RiskChanged {
                from: prev_level,
                to: fusion.fused,
            });
        }

        self.last_fusion = Some(fusion);
        fusion
    }

    // ── Queries ───────────────────────────────────────────────

    /// Active alert level.
    pub fn level(&self) -> RiskLevel {
        self.actuator.level()
    }

    /// Fusion result of the most recent cycle.
    pub fn last_fusion(&self) -> Option<FusionResult> {
        self.last_fusion
    }

    /// Timestamp of the last warning pulse, `None` when stale.
    pub fn last_pulse_ms(&self) -> Option<u64> {
        self.actuator.last_pulse_ms()
    }

    /// Timestamp of the last prediction request attempt.
    pub fn last_sent_ms(&self) -> Option<u64> {
        self.last_sent_ms
    }

    /// Cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn device_id(&self) -> &str {
        self.remote.device_id()
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}

// ── Internal ──────────────────────────────────────────────────

/// Translate actuator commands into port calls.
fn apply_outputs(outputs: &AlertOutputs, alerts: &mut impl AlertPort) {
    alerts.set_safe(outputs.safe);
    alerts.set_problem(outputs.problem);
    match outputs.alarm {
        AlarmDrive::Unchanged => {}
        AlarmDrive::On => alerts.set_alarm(true),
        AlarmDrive::Off => alerts.set_alarm(false),
        AlarmDrive::Pulse(ms) => alerts.pulse_alarm(ms),
    }
}
