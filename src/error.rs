//! Unified error types for the HealthMon firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! entry point's error handling uniform.  All variants are `Copy` so they
//! can be passed through the monitor service and logged without
//! allocation.  None of these are fatal to the acquisition loop: every
//! failure degrades to the safest available reading.

use core::fmt;

use crate::adapters::wifi::ConnectivityError;
use crate::app::ports::PredictionError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned out-of-range data.
    Sensor(SensorError),
    /// An indicator or alarm output could not be driven.
    Alert(AlertError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Alert(e) => write!(f, "alert: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error or timed out.
    AdcReadFailed,
    /// The driver has not published a valid frame.
    NoData,
    /// Frame decoded to NaN or a checksum failure.
    InvalidReading,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// The peripheral was not detected at boot.
    NotPresent,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed => write!(f, "ADC read failed"),
            Self::NoData => write!(f, "no valid frame"),
            Self::InvalidReading => write!(f, "invalid reading"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NotPresent => write!(f, "sensor not present"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Alert output errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for AlertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<AlertError> for Error {
    fn from(e: AlertError) -> Self {
        Self::Alert(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    Connectivity(ConnectivityError),
    Prediction(PredictionError),
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connectivity(e) => write!(f, "WiFi: {e}"),
            Self::Prediction(e) => write!(f, "prediction: {e}"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Comms(CommsError::Connectivity(e))
    }
}

impl From<PredictionError> for Error {
    fn from(e: PredictionError) -> Self {
        Self::Comms(CommsError::Prediction(e))
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
