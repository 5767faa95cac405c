//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService (domain)
//! ```
//!
//! Driven adapters (sensors, alert outputs, prediction transport, display,
//! event sinks) implement these traits.  The
//! [`MonitorService`](super::service::MonitorService) consumes them via
//! generics, so the domain core never touches hardware or the network
//! directly.

use core::fmt;
use core::time::Duration;

use crate::risk::RiskLevel;
use crate::risk::remote::{PredictionRequest, PredictionResponse};
use crate::sensors::SensorSample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per acquisition cycle.
pub trait SensorPort {
    /// Read every sensor and return an immutable sample.
    ///
    /// Never fails: unavailable readings are substituted by the adapter.
    fn read_sample(&mut self) -> SensorSample;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: monotonic uptime)
// ───────────────────────────────────────────────────────────────

/// Monotonic uptime source.
///
/// Read at every point where time matters instead of once per cycle: the
/// remote call may block for seconds between two reads.
pub trait ClockPort {
    fn uptime_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Alert port (driven adapter: domain → indicators / buzzer)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the three binary alert outputs.
///
/// Only the alert actuator drives these.  Implementations log and swallow
/// pin errors; the domain assumes the outputs are always writable.
pub trait AlertPort {
    /// Steady "safe" indicator.
    fn set_safe(&mut self, on: bool);

    /// "Problem" indicator (Warning and Critical).
    fn set_problem(&mut self, on: bool);

    /// Alarm output held at a level.
    fn set_alarm(&mut self, on: bool);

    /// Drive the alarm ON for `duration_ms`, then OFF.  Blocks for the
    /// duration of the pulse.
    fn pulse_alarm(&mut self, duration_ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Prediction port (driven adapter: domain → remote risk service)
// ───────────────────────────────────────────────────────────────

/// Transport to the remote prediction service.
///
/// One blocking request/response exchange, bounded by `timeout`.
/// Wire encoding and HTTP details belong to the adapter.
pub trait PredictionPort {
    fn predict(
        &mut self,
        request: &PredictionRequest<'_>,
        timeout: Duration,
    ) -> Result<PredictionResponse, PredictionError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// One screenful of readings plus the active risk level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayFrame {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub air_quality: f32,
    pub heart_rate_bpm: u16,
    pub spo2_pct: u8,
    pub finger_present: bool,
    pub level: RiskLevel,
    /// Diagnostic score from the remote service, if it answered.
    pub risk_score: Option<f32>,
}

impl DisplayFrame {
    pub fn new(sample: &SensorSample, level: RiskLevel, risk_score: Option<f32>) -> Self {
        Self {
            temperature_c: sample.temperature_c,
            humidity_pct: sample.humidity_pct,
            air_quality: sample.air_quality,
            heart_rate_bpm: sample.heart_rate_bpm,
            spo2_pct: sample.spo2_pct,
            finger_present: sample.finger_present,
            level,
            risk_score,
        }
    }
}

/// Rendering collaborator.  Layout is the adapter's concern.
pub trait DisplayPort {
    fn render(&mut self, frame: &DisplayFrame);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the main loop)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a job is due.
///
/// The main loop implements this to run an acquisition cycle or a
/// connectivity check; the scheduler itself knows nothing about either.
pub trait SchedulerDelegate {
    /// Called when `job` is due.
    fn on_schedule_fired(&mut self, job: Job);
}

/// The jobs the main loop knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Full acquisition → evaluation → fusion → actuation cycle.
    Acquire,
    /// WiFi status check / reconnect.
    MaintainConnectivity,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Failure classes of one prediction exchange.  Every one of them
/// degrades the remote assessment to `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionError {
    /// No answer within the deadline.
    Timeout,
    /// Could not reach the service (DNS, TCP, TLS).
    Connect,
    /// The service answered with a non-success HTTP status.
    Status(u16),
    /// The body was not a prediction response.
    Malformed,
    /// The request could not be serialised.
    Encode,
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out"),
            Self::Connect => write!(f, "connection failed"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Malformed => write!(f, "malformed response"),
            Self::Encode => write!(f, "request encoding failed"),
        }
    }
}

/// Errors from configuration loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Override document failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
