//! Local threshold evaluator.
//!
//! Pure, total mapping from the current readings to a [`RiskLevel`].
//! Rules are checked in a fixed order (every critical rule before any
//! warning rule) and the first match wins.  Cutoff values live in
//! [`ThresholdTable`] so they can be tuned without touching the rule
//! structure.
//!
//! A SpO2 value of 0 means "no reading" and never fires a rule; vitals are
//! ignored entirely while no finger is on the sensor.

use core::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use super::RiskLevel;

/// Tunable cutoffs for the local rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    /// Air-quality ratio at or above which the air is critical.
    pub aq_critical_from: f32,
    /// Air-quality ratio above which the air is a warning (up to, not
    /// including, `aq_critical_from`).
    pub aq_warning_above: f32,
    /// Temperature (°C) below which conditions are critical.
    pub temp_critical_below_c: f32,
    /// Temperature (°C) below which conditions are a warning.
    pub temp_warning_below_c: f32,
    /// SpO2 (%) below which oxygenation is critical.
    pub spo2_critical_below: u8,
    /// SpO2 (%) below which oxygenation is a warning.
    pub spo2_warning_below: u8,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            aq_critical_from: 1.0,
            aq_warning_above: 0.85,
            temp_critical_below_c: 15.0,
            temp_warning_below_c: 18.0,
            spo2_critical_below: 92,
            spo2_warning_below: 95,
        }
    }
}

/// Identifies which rule produced a non-Normal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRule {
    AirQualityCritical,
    TemperatureCritical,
    Spo2Critical,
    AirQualityWarning,
    TemperatureWarning,
    Spo2Warning,
}

impl LocalRule {
    pub const fn level(self) -> RiskLevel {
        match self {
            Self::AirQualityCritical | Self::TemperatureCritical | Self::Spo2Critical => {
                RiskLevel::Critical
            }
            Self::AirQualityWarning | Self::TemperatureWarning | Self::Spo2Warning => {
                RiskLevel::Warning
            }
        }
    }
}

impl fmt::Display for LocalRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AirQualityCritical => write!(f, "air quality critical"),
            Self::TemperatureCritical => write!(f, "temperature critical"),
            Self::Spo2Critical => write!(f, "SpO2 critical"),
            Self::AirQualityWarning => write!(f, "air quality warning"),
            Self::TemperatureWarning => write!(f, "temperature warning"),
            Self::Spo2Warning => write!(f, "SpO2 warning"),
        }
    }
}

/// Outcome of the local evaluation: the level and the rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalAssessment {
    pub level: RiskLevel,
    /// `None` when no rule fired (Normal).
    pub rule: Option<LocalRule>,
}

impl LocalAssessment {
    const NORMAL: Self = Self {
        level: RiskLevel::Normal,
        rule: None,
    };

    fn fired(rule: LocalRule) -> Self {
        debug!("local rule fired: {rule}");
        Self {
            level: rule.level(),
            rule: Some(rule),
        }
    }
}

/// Evaluate the local rules in priority order.
pub fn evaluate_local(
    air_quality: f32,
    temperature_c: f32,
    spo2: u8,
    finger_present: bool,
    t: &ThresholdTable,
) -> LocalAssessment {
    // SpO2 only counts with a finger on the sensor and a non-zero reading.
    let spo2_valid = finger_present && spo2 > 0;

    // ── Critical ──────────────────────────────────────────────
    // The cutoff itself is critical.
    if air_quality >= t.aq_critical_from {
        return LocalAssessment::fired(LocalRule::AirQualityCritical);
    }
    if temperature_c < t.temp_critical_below_c {
        return LocalAssessment::fired(LocalRule::TemperatureCritical);
    }
    if spo2_valid && spo2 < t.spo2_critical_below {
        return LocalAssessment::fired(LocalRule::Spo2Critical);
    }

    // ── Warning ───────────────────────────────────────────────
    if air_quality > t.aq_warning_above && air_quality < t.aq_critical_from {
        return LocalAssessment::fired(LocalRule::AirQualityWarning);
    }
    if temperature_c >= t.temp_critical_below_c && temperature_c < t.temp_warning_below_c {
        return LocalAssessment::fired(LocalRule::TemperatureWarning);
    }
    if spo2_valid && spo2 >= t.spo2_critical_below && spo2 < t.spo2_warning_below {
        return LocalAssessment::fired(LocalRule::Spo2Warning);
    }

    LocalAssessment::NORMAL
}

/// Convenience wrapper returning only the level.
pub fn evaluate_local_level(
    air_quality: f32,
    temperature_c: f32,
    spo2: u8,
    finger_present: bool,
    t: &ThresholdTable,
) -> RiskLevel {
    evaluate_local(air_quality, temperature_c, spo2, finger_present, t).level
}
