//! Shared mutable context threaded through every alert state handler.
//!
//! `AlertContext` is the single struct that state handlers read from and
//! write to: the cycle timestamp, the warning-pulse bookkeeping, the alarm
//! timing configuration and the output commands for this cycle.

use crate::config::AlarmConfig;

// ---------------------------------------------------------------------------
// Output commands (written by state handlers; applied by the monitor service)
// ---------------------------------------------------------------------------

/// What to do with the alarm output this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmDrive {
    /// Leave the alarm exactly as it is.
    Unchanged,
    /// Hold the alarm ON.
    On,
    /// Hold the alarm OFF.
    Off,
    /// Drive ON for the given milliseconds, then OFF.
    Pulse(u32),
}

/// Commands that state handlers write to request output changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertOutputs {
    /// Steady "safe" indicator.
    pub safe: bool,
    /// "Problem" indicator.
    pub problem: bool,
    pub alarm: AlarmDrive,
}

impl Default for AlertOutputs {
    fn default() -> Self {
        Self::normal()
    }
}

impl AlertOutputs {
    /// Safe ON, everything else OFF.
    pub const fn normal() -> Self {
        Self {
            safe: true,
            problem: false,
            alarm: AlarmDrive::Off,
        }
    }
}

// ---------------------------------------------------------------------------
// AlertContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct AlertContext {
    // -- Timing --
    /// Monotonic timestamp of the current cycle (milliseconds).
    pub now_ms: u64,
    /// When the last warning pulse was emitted.  `None` = stale.
    pub last_pulse_ms: Option<u64>,
    /// Cycles elapsed since the current state was entered.
    pub cycles_in_state: u64,
    /// Monotonic total cycle count.
    pub total_cycles: u64,

    // -- Outputs --
    /// Commands to be applied to the alert outputs after the FSM tick.
    pub outputs: AlertOutputs,

    // -- Configuration --
    pub alarm: AlarmConfig,
}

impl AlertContext {
    pub fn new(alarm: AlarmConfig) -> Self {
        Self {
            now_ms: 0,
            last_pulse_ms: None,
            cycles_in_state: 0,
            total_cycles: 0,
            outputs: AlertOutputs::normal(),
            alarm,
        }
    }

    /// Whether a warning pulse is due at `now_ms`.
    ///
    /// Due when no pulse has been recorded, or at least
    /// `pulse_interval_ms` has elapsed since the last one.
    pub fn pulse_due(&self) -> bool {
        match self.last_pulse_ms {
            None => true,
            Some(last) => {
                self.now_ms.saturating_sub(last) >= u64::from(self.alarm.pulse_interval_ms)
            }
        }
    }
}
