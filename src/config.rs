//! System configuration parameters
//!
//! All tunable parameters for the HealthMon system.  Defaults hold the
//! reference calibration; a JSON override document (or build-time
//! environment for credentials) can replace them without touching logic.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::risk::local::ThresholdTable;
use crate::sensors::gas::AnalogCalibration;

/// Loop cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Acquisition cycle period (milliseconds).
    pub poll_interval_ms: u32,
    /// Connectivity maintenance period (milliseconds).
    pub connectivity_check_interval_ms: u32,
    /// Upper bound on one remote prediction call (milliseconds).
    pub remote_timeout_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 4_000,
            connectivity_check_interval_ms: 30_000,
            remote_timeout_ms: 10_000,
        }
    }
}

/// Warning-state alarm cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Minimum time between two warning pulses (milliseconds).
    pub pulse_interval_ms: u32,
    /// Length of one warning pulse (milliseconds).
    pub pulse_duration_ms: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            pulse_interval_ms: 2_000,
            pulse_duration_ms: 200,
        }
    }
}

/// Substitutes used when a sensor cannot deliver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackConfig {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// IR level above which a finger is considered present.
    pub finger_ir_floor: u32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            temperature_c: 25.0,
            humidity_pct: 50.0,
            finger_ir_floor: 50_000,
        }
    }
}

/// Network identity and prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
    /// Base URL of the prediction service, e.g. `http://192.168.1.10:8000`.
    pub endpoint: heapless::String<96>,
    /// Empty = derive from the factory MAC.
    pub device_id: heapless::String<32>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: heapless::String::new(),
            wifi_password: heapless::String::new(),
            endpoint: bounded("http://192.168.1.100:8000"),
            device_id: heapless::String::new(),
        }
    }
}

impl NetworkConfig {
    /// Defaults overlaid with build-time environment values, if set.
    pub fn from_build_env() -> Self {
        Self::default().with_build_env()
    }

    /// Replace each field whose `HEALTHMON_*` variable was set at build time.
    pub fn with_build_env(self) -> Self {
        let mut cfg = self;
        if let Some(v) = option_env!("HEALTHMON_WIFI_SSID") {
            cfg.wifi_ssid = bounded(v);
        }
        if let Some(v) = option_env!("HEALTHMON_WIFI_PASS") {
            cfg.wifi_password = bounded(v);
        }
        if let Some(v) = option_env!("HEALTHMON_ENDPOINT") {
            cfg.endpoint = bounded(v);
        }
        if let Some(v) = option_env!("HEALTHMON_DEVICE_ID") {
            cfg.device_id = bounded(v);
        }
        cfg
    }
}

/// Copy `s` into a bounded string, truncating at capacity.
pub fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub timing: TimingConfig,
    pub alarm: AlarmConfig,
    pub thresholds: ThresholdTable,
    pub calibration: AnalogCalibration,
    pub fallback: FallbackConfig,
    pub network: NetworkConfig,
}

impl SystemConfig {
    /// Parse an override document; missing sections keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Boot-time configuration: the override document if one was given,
    /// else defaults, then build-time network values on top.
    pub fn load(override_doc: Option<&str>) -> Result<Self, ConfigError> {
        let mut cfg = match override_doc {
            Some(doc) => Self::from_json(doc)?,
            None => Self::default(),
        };
        cfg.network = cfg.network.with_build_env();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        if t.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be > 0"));
        }
        if t.connectivity_check_interval_ms < t.poll_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "connectivity_check_interval_ms must be >= poll_interval_ms",
            ));
        }
        if t.remote_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("remote_timeout_ms must be > 0"));
        }

        let a = &self.alarm;
        if a.pulse_duration_ms == 0 || a.pulse_duration_ms >= a.pulse_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "pulse_duration_ms must be in (0, pulse_interval_ms)",
            ));
        }

        let th = &self.thresholds;
        if !(th.aq_warning_above < th.aq_critical_from) {
            return Err(ConfigError::ValidationFailed(
                "aq_warning_above must be below aq_critical_from",
            ));
        }
        if !(th.temp_critical_below_c < th.temp_warning_below_c) {
            return Err(ConfigError::ValidationFailed(
                "temp_critical_below_c must be below temp_warning_below_c",
            ));
        }
        if th.spo2_critical_below == 0
            || th.spo2_critical_below >= th.spo2_warning_below
            || th.spo2_warning_below > 100
        {
            return Err(ConfigError::ValidationFailed(
                "spo2 cutoffs must satisfy 0 < critical < warning <= 100",
            ));
        }

        let c = &self.calibration;
        if c.full_scale == 0 || !(c.reference_voltage > 0.0) || !(c.calibration_voltage > 0.0) {
            return Err(ConfigError::ValidationFailed(
                "calibration voltages and full_scale must be > 0",
            ));
        }
        if !(c.scale_factor > 0.0) {
            return Err(ConfigError::ValidationFailed("scale_factor must be > 0"));
        }

        if self.network.endpoint.is_empty() {
            return Err(ConfigError::ValidationFailed("endpoint must not be empty"));
        }
        Ok(())
    }
}
