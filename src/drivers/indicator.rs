//! Binary alert outputs: the two indicator LEDs and the buzzer.
//!
//! Generic over `embedded_hal::digital::OutputPin` so the same driver runs
//! on `esp_idf_svc::hal::gpio::PinDriver` and on host mock pins.  Pin errors are
//! logged and swallowed; the alert path never fails.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

use crate::error::AlertError;

/// A single on/off output that remembers its last commanded level.
pub struct Indicator<P: OutputPin> {
    pin: P,
    name: &'static str,
    on: bool,
}

impl<P: OutputPin> Indicator<P> {
    /// Wrap `pin` and drive it LOW.
    pub fn new(pin: P, name: &'static str) -> Self {
        let mut ind = Self {
            pin,
            name,
            on: true,
        };
        ind.set(false);
        ind
    }

    /// Drive the output.  Write errors are logged; the cached level still
    /// reflects the command.
    pub fn set(&mut self, on: bool) {
        if let Err(e) = self.write(on) {
            warn!("{}: {e}", self.name);
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn write(&mut self, on: bool) -> Result<(), AlertError> {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        res.map_err(|_| AlertError::GpioWriteFailed)
    }
}

/// Buzzer with a blocking pulse helper.
pub struct Buzzer<P: OutputPin, D: DelayNs> {
    out: Indicator<P>,
    delay: D,
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    pub fn new(pin: P, delay: D) -> Self {
        Self {
            out: Indicator::new(pin, "alarm"),
            delay,
        }
    }

    pub fn set(&mut self, on: bool) {
        self.out.set(on);
    }

    /// ON for `duration_ms`, then OFF.
    pub fn pulse(&mut self, duration_ms: u32) {
        self.out.set(true);
        self.delay.delay_ms(duration_ms);
        self.out.set(false);
    }

    pub fn is_on(&self) -> bool {
        self.out.is_on()
    }
}
