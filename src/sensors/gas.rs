//! MQ-135 gas sensor and the analog conditioner.
//!
//! The sensor's load-resistor voltage is read through an ESP32 ADC channel
//! and normalised into a dimensionless air-quality ratio by [`normalize`].
//! The calibration constants live in [`AnalogCalibration`] so the unit can
//! be re-calibrated through configuration.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the gas ADC channel via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicI32` for injection.

use core::sync::atomic::AtomicI32;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

use serde::{Deserialize, Serialize};

#[cfg(target_os = "espidf")]
use log::warn;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

static SIM_GAS_ADC: AtomicI32 = AtomicI32::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw: i32) {
    SIM_GAS_ADC.store(raw, Ordering::Relaxed);
}

/// Conversion constants from ADC code to air-quality ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalogCalibration {
    /// ADC code corresponding to `reference_voltage`.
    pub full_scale: u16,
    /// ADC reference voltage (V).
    pub reference_voltage: f32,
    /// Empirical sensor voltage mapped to a ratio of 1.0 (V).
    pub calibration_voltage: f32,
    /// Linear factor applied after the voltage division.
    pub scale_factor: f32,
}

impl Default for AnalogCalibration {
    fn default() -> Self {
        Self {
            full_scale: 4095,
            reference_voltage: 3.3,
            calibration_voltage: 2.0,
            scale_factor: 1.0,
        }
    }
}

/// Convert a raw ADC code into an air-quality ratio (never negative).
pub fn normalize(raw: i32, cal: &AnalogCalibration) -> f32 {
    if raw <= 0 || cal.full_scale == 0 || cal.calibration_voltage <= 0.0 {
        return 0.0;
    }
    let voltage = raw as f32 / f32::from(cal.full_scale) * cal.reference_voltage;
    (voltage / cal.calibration_voltage * cal.scale_factor).max(0.0)
}

#[derive(Debug, Clone, Copy)]
pub struct GasReading {
    pub raw: i32,
    pub ratio: f32,
}

pub struct GasSensor {
    cal: AnalogCalibration,
    _adc_gpio: i32,
}

impl GasSensor {
    pub fn new(adc_gpio: i32, cal: AnalogCalibration) -> Self {
        Self {
            cal,
            _adc_gpio: adc_gpio,
        }
    }

    pub fn set_calibration(&mut self, cal: AnalogCalibration) {
        self.cal = cal;
    }

    pub fn read(&self) -> GasReading {
        let raw = self.read_adc();
        GasReading {
            raw,
            ratio: normalize(raw, &self.cal),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> i32 {
        match hw_init::adc1_read(hw_init::ADC1_CH_GAS) {
            Ok(raw) => i32::from(raw),
            Err(e) => {
                warn!("gas: {e}, reading as 0");
                0
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> i32 {
        SIM_GAS_ADC.load(Ordering::Relaxed)
    }
}
