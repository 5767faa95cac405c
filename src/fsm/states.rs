//! Concrete alert state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!            ┌──────────── fused level each cycle ────────────┐
//!            ▼                      ▼                         ▼
//!         NORMAL                 WARNING                  CRITICAL
//!   safe ON, alarm OFF    problem ON, alarm pulse   problem ON, alarm ON
//!                         every pulse_interval_ms
//! ```
//!
//! There is no hysteresis between levels; the owner forces the fused level
//! as the current state before every tick.

use super::context::{AlarmDrive, AlertContext, AlertOutputs};
use super::{StateDescriptor, StateId};
use log::{debug, info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Normal
        StateDescriptor {
            name: "Normal",
            on_enter: Some(normal_enter),
            on_exit: None,
            on_update: normal_update,
        },
        // Index 1 — Warning
        StateDescriptor {
            name: "Warning",
            on_enter: Some(warning_enter),
            on_exit: None,
            on_update: warning_update,
        },
        // Index 2 — Critical
        StateDescriptor {
            name: "Critical",
            on_enter: Some(critical_enter),
            on_exit: Some(critical_exit),
            on_update: critical_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  NORMAL state
// ═══════════════════════════════════════════════════════════════════════════

fn normal_enter(ctx: &mut AlertContext) {
    ctx.last_pulse_ms = None;
    ctx.outputs = AlertOutputs::normal();
    info!("NORMAL: all clear");
}

fn normal_update(ctx: &mut AlertContext) -> Option<StateId> {
    ctx.outputs = AlertOutputs::normal();
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  WARNING state — problem indicator, rate-limited alarm pulses
// ═══════════════════════════════════════════════════════════════════════════

fn warning_enter(ctx: &mut AlertContext) {
    ctx.outputs.safe = false;
    ctx.outputs.problem = true;
    info!(
        "WARNING: pulsing alarm every {} ms",
        ctx.alarm.pulse_interval_ms
    );
}

fn warning_update(ctx: &mut AlertContext) -> Option<StateId> {
    ctx.outputs.safe = false;
    ctx.outputs.problem = true;

    if ctx.pulse_due() {
        ctx.outputs.alarm = AlarmDrive::Pulse(ctx.alarm.pulse_duration_ms);
        ctx.last_pulse_ms = Some(ctx.now_ms);
        debug!("WARNING: alarm pulse at {} ms", ctx.now_ms);
    } else {
        ctx.outputs.alarm = AlarmDrive::Unchanged;
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  CRITICAL state — alarm held continuously
// ═══════════════════════════════════════════════════════════════════════════

fn critical_enter(ctx: &mut AlertContext) {
    ctx.last_pulse_ms = None;
    ctx.outputs = AlertOutputs {
        safe: false,
        problem: true,
        alarm: AlarmDrive::On,
    };
    warn!("CRITICAL: alarm held ON");
}

fn critical_exit(_ctx: &mut AlertContext) {
    info!("CRITICAL: cleared, releasing continuous alarm");
}

fn critical_update(ctx: &mut AlertContext) -> Option<StateId> {
    ctx.outputs = AlertOutputs {
        safe: false,
        problem: true,
        alarm: AlarmDrive::On,
    };
    None
}
