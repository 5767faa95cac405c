//! Remote risk client contract.
//!
//! Sends the current readings to the prediction service through a
//! [`PredictionPort`] and maps the categorical answer onto a
//! [`RiskLevel`].  The client never fails its caller: being offline, a
//! timeout, a rejected request or a malformed body all degrade to
//! `Normal`, leaving the local evaluator as the safety backstop.
//!
//! | `risk_level` | Result   |
//! |--------------|----------|
//! | `"High"`     | Critical |
//! | `"Moderate"` | Warning  |
//! | anything else / absent | Normal |

use core::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::RiskLevel;
use crate::app::ports::{ClockPort, PredictionError, PredictionPort};
use crate::config::bounded;
use crate::sensors::SensorSample;

/// Path of the prediction route on the backend.
pub const PREDICT_PATH: &str = "/api/predictions/predict";

/// Outbound payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionRequest<'a> {
    pub air_quality: f32,
    pub temperature: f32,
    pub humidity: f32,
    pub heart_rate: u16,
    pub spo2: u8,
    pub device_id: &'a str,
}

impl<'a> PredictionRequest<'a> {
    pub fn from_sample(sample: &SensorSample, device_id: &'a str) -> Self {
        Self {
            air_quality: sample.air_quality,
            temperature: sample.temperature_c,
            humidity: sample.humidity_pct,
            heart_rate: sample.heart_rate_bpm,
            spo2: sample.spo2_pct,
            device_id,
        }
    }
}

/// Inbound payload.  Only `risk_level` drives decisions; the remaining
/// fields are diagnostic.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PredictionResponse {
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub risk_score: f32,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl PredictionResponse {
    /// Decode a response body.
    pub fn from_json(body: &[u8]) -> Result<Self, PredictionError> {
        serde_json::from_slice(body).map_err(|_| PredictionError::Malformed)
    }

    /// Map the categorical field onto a risk level.
    pub fn level(&self) -> RiskLevel {
        match self.risk_level.as_deref() {
            Some("High") => RiskLevel::Critical,
            Some("Moderate") => RiskLevel::Warning,
            _ => RiskLevel::Normal,
        }
    }
}

/// How the remote assessment was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteOutcome {
    /// No network; no request was attempted.
    Offline,
    /// The request failed; the level was substituted with Normal.
    Failed(PredictionError),
    /// The service answered.
    Assessed {
        risk_score: f32,
        confidence: Option<f32>,
    },
}

/// Result of one remote assessment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RemoteAssessment {
    pub level: RiskLevel,
    pub outcome: RemoteOutcome,
}

impl RemoteAssessment {
    fn fallback(outcome: RemoteOutcome) -> Self {
        Self {
            level: RiskLevel::Normal,
            outcome,
        }
    }

    pub fn risk_score(&self) -> Option<f32> {
        match self.outcome {
            RemoteOutcome::Assessed { risk_score, .. } => Some(risk_score),
            _ => None,
        }
    }
}

/// Best-effort client for the prediction service.
pub struct RemoteRiskClient {
    device_id: heapless::String<32>,
    timeout: Duration,
}

impl RemoteRiskClient {
    pub fn new(device_id: &str, timeout_ms: u32) -> Self {
        Self {
            device_id: bounded(device_id),
            timeout: Duration::from_millis(u64::from(timeout_ms)),
        }
    }

    pub fn device_id(&self) -> &str {
        self.device_id.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask the service for its assessment of `sample`.
    ///
    /// Always returns a level; failures are logged and become `Normal`.
    pub fn assess(
        &self,
        sample: &SensorSample,
        connected: bool,
        port: &mut impl PredictionPort,
        clock: &impl ClockPort,
    ) -> RemoteAssessment {
        if !connected {
            info!("remote: offline, relying on local assessment");
            return RemoteAssessment::fallback(RemoteOutcome::Offline);
        }

        let request = PredictionRequest::from_sample(sample, self.device_id.as_str());
        let started_ms = clock.uptime_ms();
        let result = port.predict(&request, self.timeout);
        let elapsed_ms = clock.uptime_ms().saturating_sub(started_ms);

        // A transport that overruns the deadline still counts as a timeout.
        let result = match result {
            Ok(_) if u128::from(elapsed_ms) > self.timeout.as_millis() => {
                Err(PredictionError::Timeout)
            }
            other => other,
        };

        match result {
            Ok(resp) => {
                let level = resp.level();
                info!(
                    "remote: risk_level={} score={:.2} -> {}",
                    resp.risk_level.as_deref().unwrap_or("<absent>"),
                    resp.risk_score,
                    level
                );
                RemoteAssessment {
                    level,
                    outcome: RemoteOutcome::Assessed {
                        risk_score: resp.risk_score,
                        confidence: resp.confidence,
                    },
                }
            }
            Err(e) => {
                warn!("remote: prediction failed ({e}), substituting NORMAL");
                RemoteAssessment::fallback(RemoteOutcome::Failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    /// Manually advanced uptime.
    #[derive(Default)]
    struct TestClock(Cell<u64>);

    impl ClockPort for TestClock {
        fn uptime_ms(&self) -> u64 {
            self.0.get()
        }
    }

    /// Answers successfully, but only after `delay_ms` on `clock`.
    struct Slow<'c> {
        clock: &'c TestClock,
        delay_ms: u64,
    }

    impl PredictionPort for Slow<'_> {
        fn predict(
            &mut self,
            _request: &PredictionRequest<'_>,
            _timeout: Duration,
        ) -> Result<PredictionResponse, PredictionError> {
            self.clock.0.set(self.clock.0.get() + self.delay_ms);
            reply("High")
        }
    }

    struct Scripted(Option<Result<PredictionResponse, PredictionError>>, u32);

    impl PredictionPort for Scripted {
        fn predict(
            &mut self,
            _request: &PredictionRequest<'_>,
            _timeout: Duration,
        ) -> Result<PredictionResponse, PredictionError> {
            self.1 += 1;
            self.0.take().unwrap_or(Err(PredictionError::Connect))
        }
    }

    fn sample() -> SensorSample {
        SensorSample::new(0.4, 22.0, 45.0, 72, 98, true)
    }

    fn reply(level: &str) -> Result<PredictionResponse, PredictionError> {
        Ok(PredictionResponse {
            risk_level: Some(level.to_string()),
            risk_score: 0.5,
            ..PredictionResponse::default()
        })
    }

    #[test]
    fn categorical_mapping() {
        let client = RemoteRiskClient::new("HM-TEST", 10_000);
        for (label, expected) in [
            ("High", RiskLevel::Critical),
            ("Moderate", RiskLevel::Warning),
            ("Low", RiskLevel::Normal),
            ("Unknown", RiskLevel::Normal),
        ] {
            let mut port = Scripted(Some(reply(label)), 0);
            let a = client.assess(&sample(), true, &mut port, &TestClock::default());
            assert_eq!(a.level, expected, "{label}");
        }
    }

    #[test]
    fn offline_skips_request() {
        let client = RemoteRiskClient::new("HM-TEST", 10_000);
        let mut port = Scripted(Some(reply("High")), 0);
        let a = client.assess(&sample(), false, &mut port, &TestClock::default());
        assert_eq!(a.level, RiskLevel::Normal);
        assert_eq!(a.outcome, RemoteOutcome::Offline);
        assert_eq!(port.1, 0, "no request while offline");
    }

    #[test]
    fn failures_degrade_to_normal() {
        let client = RemoteRiskClient::new("HM-TEST", 10_000);
        for err in [
            PredictionError::Timeout,
            PredictionError::Connect,
            PredictionError::Status(500),
            PredictionError::Malformed,
        ] {
            let mut port = Scripted(Some(Err(err)), 0);
            let a = client.assess(&sample(), true, &mut port, &TestClock::default());
            assert_eq!(a.level, RiskLevel::Normal);
            assert_eq!(a.outcome, RemoteOutcome::Failed(err));
            assert_eq!(a.risk_score(), None);
        }
    }

    #[test]
    fn late_success_is_discarded_as_timeout() {
        let client = RemoteRiskClient::new("HM-TEST", 10_000);
        let clock = TestClock::default();

        let mut late = Slow { clock: &clock, delay_ms: 10_001 };
        let a = client.assess(&sample(), true, &mut late, &clock);
        assert_eq!(a.level, RiskLevel::Normal);
        assert_eq!(a.outcome, RemoteOutcome::Failed(PredictionError::Timeout));

        // Exactly at the deadline still counts.
        let mut on_time = Slow { clock: &clock, delay_ms: 10_000 };
        let a = client.assess(&sample(), true, &mut on_time, &clock);
        assert_eq!(a.level, RiskLevel::Critical);
    }

    #[test]
    fn long_device_id_is_truncated() {
        let id = "X".repeat(40);
        assert_eq!(RemoteRiskClient::new(&id, 10_000).device_id().len(), 32);
    }

    #[test]
    fn response_parsing_tolerates_missing_and_extra_fields() {
        let body = br#"{"risk_level":"Moderate","confidence":0.8,"risk_score":0.55,
            "recommendations":["rest"],"timestamp":"2024-01-01T00:00:00","extra":1}"#;
        let resp = PredictionResponse::from_json(body).unwrap();
        assert_eq!(resp.level(), RiskLevel::Warning);
        assert_eq!(resp.recommendations.len(), 1);

        let resp = PredictionResponse::from_json(b"{}").unwrap();
        assert_eq!(resp.level(), RiskLevel::Normal);

        assert_eq!(
            PredictionResponse::from_json(b"<html>").unwrap_err(),
            PredictionError::Malformed
        );
    }

    #[test]
    fn request_carries_device_id_and_vitals() {
        let s = sample();
        let req = PredictionRequest::from_sample(&s, "HM-ABCDEF");
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"device_id\":\"HM-ABCDEF\""));
        assert!(json.contains("\"heart_rate\":72"));
        assert!(json.contains("\"spo2\":98"));
    }
}
