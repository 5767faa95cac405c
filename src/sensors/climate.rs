//! Capacitive humidity/temperature module (DHT22 class).
//!
//! The single-wire driver itself is an external collaborator: it runs on
//! its own cadence and publishes each decoded frame through [`publish`]
//! (or [`publish_failed`] on a checksum/timeout error).  This module keeps
//! the latest frame in lock-free atomics and substitutes a fixed fallback
//! reading whenever the last frame was invalid, so a flaky sensor never
//! aborts an acquisition cycle.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::warn;

use crate::error::SensorError;

static TEMP_BITS: AtomicU32 = AtomicU32::new(0);
static HUMIDITY_BITS: AtomicU32 = AtomicU32::new(0);
static FRAME_VALID: AtomicBool = AtomicBool::new(false);

/// Publish a decoded frame from the driver task.
pub fn publish(temperature_c: f32, humidity_pct: f32) {
    TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    HUMIDITY_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
    FRAME_VALID.store(true, Ordering::Release);
}

/// Mark the latest frame as unusable.
pub fn publish_failed() {
    FRAME_VALID.store(false, Ordering::Release);
}

/// Physically plausible limits for the module.
const TEMP_RANGE_C: (f32, f32) = (-40.0, 80.0);
const HUMIDITY_RANGE_PCT: (f32, f32) = (0.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    /// True when the fallback values were substituted.
    pub fallback: bool,
}

pub struct ClimateSensor {
    fallback_temperature_c: f32,
    fallback_humidity_pct: f32,
    _data_gpio: i32,
}

impl ClimateSensor {
    pub fn new(data_gpio: i32, fallback_temperature_c: f32, fallback_humidity_pct: f32) -> Self {
        Self {
            fallback_temperature_c,
            fallback_humidity_pct,
            _data_gpio: data_gpio,
        }
    }

    /// Latest reading, or the fallback pair if the frame is invalid.
    pub fn read(&self) -> ClimateReading {
        match Self::latest_frame() {
            Ok((temperature_c, humidity_pct)) => ClimateReading {
                temperature_c,
                humidity_pct,
                fallback: false,
            },
            Err(e) => {
                warn!(
                    "climate: {e}, using fallback {:.1}\u{00b0}C / {:.0}%",
                    self.fallback_temperature_c, self.fallback_humidity_pct
                );
                ClimateReading {
                    temperature_c: self.fallback_temperature_c,
                    humidity_pct: self.fallback_humidity_pct,
                    fallback: true,
                }
            }
        }
    }

    fn latest_frame() -> Result<(f32, f32), SensorError> {
        if !FRAME_VALID.load(Ordering::Acquire) {
            return Err(SensorError::NoData);
        }
        let t = f32::from_bits(TEMP_BITS.load(Ordering::Relaxed));
        let h = f32::from_bits(HUMIDITY_BITS.load(Ordering::Relaxed));
        validate_frame(t, h)
    }
}

/// Reject NaN and out-of-range values.
pub fn validate_frame(temperature_c: f32, humidity_pct: f32) -> Result<(f32, f32), SensorError> {
    if temperature_c.is_nan() || humidity_pct.is_nan() {
        return Err(SensorError::InvalidReading);
    }
    if !(TEMP_RANGE_C.0..=TEMP_RANGE_C.1).contains(&temperature_c)
        || !(HUMIDITY_RANGE_PCT.0..=HUMIDITY_RANGE_PCT.1).contains(&humidity_pct)
    {
        return Err(SensorError::OutOfRange);
    }
    Ok((temperature_c, humidity_pct))
}
