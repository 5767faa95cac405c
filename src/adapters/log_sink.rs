//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::risk::RiskLevel;
use crate::risk::remote::RemoteOutcome;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(t) => {
                let s = &t.sample;
                let remote = match t.remote {
                    RemoteOutcome::Offline => "offline",
                    RemoteOutcome::Failed(_) => "failed",
                    RemoteOutcome::Assessed { .. } => "ok",
                };
                info!(
                    "TELEM | #{} | AQ={:.2} T={:.1}\u{00b0}C H={:.0}% | HR={} SpO2={} finger={} | \
                     local={} remote={}({}) score={:?} -> {} | wifi={}",
                    t.cycle,
                    s.air_quality,
                    s.temperature_c,
                    s.humidity_pct,
                    s.heart_rate_bpm,
                    s.spo2_pct,
                    s.finger_present,
                    t.fusion.local,
                    t.fusion.remote,
                    remote,
                    t.risk_score(),
                    t.fusion.fused,
                    if t.connected { "up" } else { "down" },
                );
            }
            AppEvent::RiskChanged { from, to } => {
                if *to == RiskLevel::Critical {
                    warn!("RISK | {} -> {}", from, to);
                } else {
                    info!("RISK | {} -> {}", from, to);
                }
            }
            AppEvent::Started(level) => {
                info!("START | initial_level={}", level);
            }
        }
    }
}
