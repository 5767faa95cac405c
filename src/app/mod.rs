//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the orchestration rules for the HealthMon
//! system: one acquisition cycle runs local and remote assessment, fuses
//! them and drives the alert actuator.  All interaction with hardware and
//! the network happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod runner;
pub mod service;
