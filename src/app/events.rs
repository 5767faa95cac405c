//! Outbound application events.
//!
//! The [`MonitorService`](super::service::MonitorService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them: log to serial, forward
//! over the network, etc.

use crate::risk::remote::RemoteOutcome;
use crate::risk::{FusionResult, RiskLevel};
use crate::sensors::SensorSample;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// One acquisition cycle completed.
    Cycle(TelemetryData),

    /// The fused risk level changed between cycles.
    RiskChanged { from: RiskLevel, to: RiskLevel },

    /// The monitor service has started (carries the initial level).
    Started(RiskLevel),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone)]
pub struct TelemetryData {
    /// Cycle counter, starting at 1.
    pub cycle: u64,
    pub sample: SensorSample,
    pub fusion: FusionResult,
    pub remote: RemoteOutcome,
    /// Whether the network was up when the cycle started.
    pub connected: bool,
    /// Uptime at the start of the cycle (milliseconds).
    pub uptime_ms: u64,
}

impl TelemetryData {
    pub fn risk_score(&self) -> Option<f32> {
        match self.remote {
            RemoteOutcome::Assessed { risk_score, .. } => Some(risk_score),
            _ => None,
        }
    }
}
