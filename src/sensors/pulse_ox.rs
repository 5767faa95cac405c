//! MAX30102 photoplethysmography (pulse oximeter) front end.
//!
//! The I²C driver and beat/SpO2 algorithm are external collaborators.  They
//! publish the raw IR level plus their latest heart-rate/SpO2 estimate via
//! [`publish`].  Finger presence is derived here from the IR level: below
//! the detection floor the vitals are reported as absent (0).

use core::sync::atomic::{AtomicU32, Ordering};

static IR_LEVEL: AtomicU32 = AtomicU32::new(0);
/// Packed `heart_rate | spo2 << 16`, written as one unit.
static VITALS: AtomicU32 = AtomicU32::new(0);

/// Publish the latest IR level and vitals estimate from the driver task.
pub fn publish(ir: u32, heart_rate_bpm: u16, spo2_pct: u8) {
    VITALS.store(pack(heart_rate_bpm, spo2_pct), Ordering::Relaxed);
    IR_LEVEL.store(ir, Ordering::Release);
}

fn pack(hr: u16, spo2: u8) -> u32 {
    u32::from(hr) | (u32::from(spo2) << 16)
}

fn unpack(v: u32) -> (u16, u8) {
    ((v & 0xFFFF) as u16, ((v >> 16) & 0xFF) as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseOxReading {
    pub ir: u32,
    pub finger_present: bool,
    /// 0 when unavailable.
    pub heart_rate_bpm: u16,
    /// 0 when unavailable.
    pub spo2_pct: u8,
}

/// Gate raw vitals on finger presence.
pub fn gate(ir: u32, heart_rate_bpm: u16, spo2_pct: u8, ir_floor: u32) -> PulseOxReading {
    let finger_present = ir > ir_floor;
    if finger_present {
        PulseOxReading {
            ir,
            finger_present,
            heart_rate_bpm,
            spo2_pct: spo2_pct.min(100),
        }
    } else {
        PulseOxReading {
            ir,
            finger_present,
            heart_rate_bpm: 0,
            spo2_pct: 0,
        }
    }
}

pub struct PulseOximeter {
    ir_floor: u32,
    available: bool,
}

impl PulseOximeter {
    /// `available = false` when the module was not found at boot; reads
    /// then always report no finger.
    pub fn new(ir_floor: u32, available: bool) -> Self {
        Self {
            ir_floor,
            available,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn read(&self) -> PulseOxReading {
        if !self.available {
            return gate(0, 0, 0, self.ir_floor);
        }
        let ir = IR_LEVEL.load(Ordering::Acquire);
        let (hr, spo2) = unpack(VITALS.load(Ordering::Relaxed));
        gate(ir, hr, spo2, self.ir_floor)
    }
}
