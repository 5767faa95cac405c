//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the three alert outputs, exposing them
//! through [`SensorPort`] and [`AlertPort`].  Generic over the
//! `embedded-hal` pin and delay types so the same adapter runs on
//! `esp_idf_svc::hal` drivers and on host mocks.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::app::ports::{AlertPort, SensorPort};
use crate::drivers::indicator::{Buzzer, Indicator};
use crate::sensors::{SensorHub, SensorSample};

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P: OutputPin, D: DelayNs> {
    sensor_hub: SensorHub,
    safe: Indicator<P>,
    problem: Indicator<P>,
    alarm: Buzzer<P, D>,
}

impl<P: OutputPin, D: DelayNs> HardwareAdapter<P, D> {
    pub fn new(sensor_hub: SensorHub, safe: P, problem: P, alarm: P, delay: D) -> Self {
        Self {
            sensor_hub,
            safe: Indicator::new(safe, "safe"),
            problem: Indicator::new(problem, "problem"),
            alarm: Buzzer::new(alarm, delay),
        }
    }

    /// Current commanded levels `(safe, problem, alarm)`.
    pub fn outputs(&self) -> (bool, bool, bool) {
        (self.safe.is_on(), self.problem.is_on(), self.alarm.is_on())
    }

    pub fn sensor_hub_mut(&mut self) -> &mut SensorHub {
        &mut self.sensor_hub
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: OutputPin, D: DelayNs> SensorPort for HardwareAdapter<P, D> {
    fn read_sample(&mut self) -> SensorSample {
        self.sensor_hub.read_all()
    }
}

// ── AlertPort implementation ──────────────────────────────────

impl<P: OutputPin, D: DelayNs> AlertPort for HardwareAdapter<P, D> {
    fn set_safe(&mut self, on: bool) {
        self.safe.set(on);
    }

    fn set_problem(&mut self, on: bool) {
        self.problem.set(on);
    }

    fn set_alarm(&mut self, on: bool) {
        self.alarm.set(on);
    }

    fn pulse_alarm(&mut self, duration_ms: u32) {
        self.alarm.pulse(duration_ms);
    }
}
