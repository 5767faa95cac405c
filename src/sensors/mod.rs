//! Sensor subsystem — individual front ends and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor front end and produces one immutable
//! [`SensorSample`] per acquisition cycle.

pub mod climate;
pub mod gas;
pub mod pulse_ox;

use climate::ClimateSensor;
use gas::GasSensor;
use pulse_ox::PulseOximeter;

/// Immutable snapshot of every reading taken in one acquisition cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSample {
    /// Normalised air-quality ratio (dimensionless, ≥ 0).
    pub air_quality: f32,
    /// Ambient temperature (°C).
    pub temperature_c: f32,
    /// Relative humidity (%).  Carried for display/telemetry only.
    pub humidity_pct: f32,
    /// Heart rate (BPM), 0 = unavailable.
    pub heart_rate_bpm: u16,
    /// Blood oxygen saturation (%), 0 = unavailable.
    pub spo2_pct: u8,
    /// Finger on the pulse oximeter.
    pub finger_present: bool,
}

impl SensorSample {
    /// Build a sample.  Vitals are zeroed when no finger is present.
    pub fn new(
        air_quality: f32,
        temperature_c: f32,
        humidity_pct: f32,
        heart_rate_bpm: u16,
        spo2_pct: u8,
        finger_present: bool,
    ) -> Self {
        let (heart_rate_bpm, spo2_pct) = if finger_present {
            (heart_rate_bpm, spo2_pct)
        } else {
            (0, 0)
        };
        Self {
            air_quality: air_quality.max(0.0),
            temperature_c,
            humidity_pct,
            heart_rate_bpm,
            spo2_pct,
            finger_present,
        }
    }
}

/// Aggregates all sensor front ends and produces a unified sample.
pub struct SensorHub {
    pub gas: GasSensor,
    pub climate: ClimateSensor,
    pub pulse_ox: PulseOximeter,
}

impl SensorHub {
    pub fn new(gas: GasSensor, climate: ClimateSensor, pulse_ox: PulseOximeter) -> Self {
        Self {
            gas,
            climate,
            pulse_ox,
        }
    }

    /// Read every sensor and return a unified sample.
    ///
    /// Unavailable readings are substituted inside each front end so a
    /// single flaky sensor never aborts the cycle.
    pub fn read_all(&mut self) -> SensorSample {
        let gas = self.gas.read();
        let climate = self.climate.read();
        let ox = self.pulse_ox.read();

        SensorSample::new(
            gas.ratio,
            climate.temperature_c,
            climate.humidity_pct,
            ox.heart_rate_bpm,
            ox.spo2_pct,
            ox.finger_present,
        )
    }
}
