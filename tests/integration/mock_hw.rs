//! Mock adapters for integration tests.
//!
//! Records every alert-output call so tests can assert on the full command
//! history without touching real GPIO, and scripts the sensor, prediction
//! and connectivity sides.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use healthmon::adapters::wifi::{ConnectivityError, ConnectivityPort};
use healthmon::app::events::AppEvent;
use healthmon::app::ports::{
    AlertPort, ClockPort, DisplayFrame, DisplayPort, EventSink, PredictionError, PredictionPort, SensorPort,
};
use healthmon::risk::RiskLevel;
use healthmon::risk::remote::{PredictionRequest, PredictionResponse};
use healthmon::sensors::SensorSample;

// ── MockClock ─────────────────────────────────────────────────

/// Shared simulated uptime.  Clones read and advance the same counter, so
/// a predictor can burn time that the runner and actuator then observe.
#[derive(Clone, Default)]
pub struct MockClock {
    now: Rc<Cell<u64>>,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, now_ms: u64) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl ClockPort for MockClock {
    fn uptime_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── Alert call record ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCall {
    Safe(bool),
    Problem(bool),
    Alarm(bool),
    Pulse(u32),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub sample: SensorSample,
    pub calls: Vec<AlertCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(sample: SensorSample) -> Self {
        Self {
            sample,
            calls: Vec::new(),
        }
    }

    pub fn safe_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                AlertCall::Safe(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn problem_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                AlertCall::Problem(on) => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Level of the alarm output after the last call (a pulse ends OFF).
    pub fn alarm_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                AlertCall::Alarm(on) => Some(*on),
                AlertCall::Pulse(_) => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn pulse_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, AlertCall::Pulse(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl SensorPort for MockHardware {
    fn read_sample(&mut self) -> SensorSample {
        self.sample
    }
}

impl AlertPort for MockHardware {
    fn set_safe(&mut self, on: bool) {
        self.calls.push(AlertCall::Safe(on));
    }

    fn set_problem(&mut self, on: bool) {
        self.calls.push(AlertCall::Problem(on));
    }

    fn set_alarm(&mut self, on: bool) {
        self.calls.push(AlertCall::Alarm(on));
    }

    fn pulse_alarm(&mut self, duration_ms: u32) {
        self.calls.push(AlertCall::Pulse(duration_ms));
    }
}

// ── MockPredictor ─────────────────────────────────────────────

/// What one recorded request carried.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRequest {
    pub air_quality: f32,
    pub spo2: u8,
    pub device_id: String,
    pub timeout: Duration,
}

/// Replays scripted replies in order; the last one repeats.
pub struct MockPredictor {
    replies: VecDeque<Result<PredictionResponse, PredictionError>>,
    fallback: Result<PredictionResponse, PredictionError>,
    pub sent: Vec<SentRequest>,
    /// Per-request latency, burned on `clock` before replying.
    latency: Option<(MockClock, u64)>,
}

#[allow(dead_code)]
impl MockPredictor {
    pub fn always(reply: Result<PredictionResponse, PredictionError>) -> Self {
        Self {
            replies: VecDeque::new(),
            fallback: reply,
            sent: Vec::new(),
            latency: None,
        }
    }

    pub fn level(risk_level: &str) -> Self {
        Self::always(Ok(response(risk_level, 0.5)))
    }

    /// Make every request take `ms` of simulated time on `clock`.
    pub fn with_latency(mut self, clock: &MockClock, ms: u64) -> Self {
        self.latency = Some((clock.clone(), ms));
        self
    }

    /// Change the latency of later requests.
    pub fn set_latency_ms(&mut self, ms: u64) {
        if let Some((_, latency)) = self.latency.as_mut() {
            *latency = ms;
        }
    }

    pub fn push(&mut self, reply: Result<PredictionResponse, PredictionError>) {
        self.replies.push_back(reply);
    }
}

pub fn response(risk_level: &str, risk_score: f32) -> PredictionResponse {
    PredictionResponse {
        risk_level: Some(risk_level.to_string()),
        risk_score,
        confidence: Some(0.9),
        ..PredictionResponse::default()
    }
}

impl PredictionPort for MockPredictor {
    fn predict(
        &mut self,
        request: &PredictionRequest<'_>,
        timeout: Duration,
    ) -> Result<PredictionResponse, PredictionError> {
        self.sent.push(SentRequest {
            air_quality: request.air_quality,
            spo2: request.spo2,
            device_id: request.device_id.to_string(),
            timeout,
        });
        if let Some((clock, ms)) = &self.latency {
            clock.advance(*ms);
        }
        self.replies
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

// ── MockNet ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockNet {
    pub up: bool,
    pub polls: Vec<u64>,
    pub connects: u32,
}

#[allow(dead_code)]
impl MockNet {
    pub fn up() -> Self {
        Self {
            up: true,
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self::default()
    }
}

impl ConnectivityPort for MockNet {
    fn connect(&mut self, _now_ms: u64) -> Result<(), ConnectivityError> {
        self.connects += 1;
        if self.up {
            Ok(())
        } else {
            Err(ConnectivityError::ConnectionFailed)
        }
    }

    fn disconnect(&mut self) {
        self.up = false;
    }

    fn is_connected(&self) -> bool {
        self.up
    }

    fn poll(&mut self, now_ms: u64) {
        self.polls.push(now_ms);
    }

    fn set_credentials(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectivityError> {
        Ok(())
    }

    fn rssi(&self) -> Option<i8> {
        self.up.then_some(-55)
    }
}

// ── Display / event sink ──────────────────────────────────────

#[derive(Default)]
pub struct RecordingDisplay {
    pub frames: Vec<DisplayFrame>,
}

impl DisplayPort for RecordingDisplay {
    fn render(&mut self, frame: &DisplayFrame) {
        self.frames.push(*frame);
    }
}

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn risk_changes(&self) -> Vec<(RiskLevel, RiskLevel)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::RiskChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn cycles(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::Cycle(_)))
            .count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Samples ───────────────────────────────────────────────────

pub fn sample(air_quality: f32, temperature_c: f32, spo2: u8, finger: bool) -> SensorSample {
    let hr = if finger { 72 } else { 0 };
    let spo2 = if finger { spo2 } else { 0 };
    SensorSample::new(air_quality, temperature_c, 45.0, hr, spo2, finger)
}
