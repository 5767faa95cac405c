//! Cooperative job scheduler.
//!
//! The main loop polls [`Scheduler::tick`] with the monotonic uptime; the
//! scheduler notifies a [`SchedulerDelegate`] when a job is due.  Jobs run
//! to completion inside the delegate call, so two jobs never interleave:
//! connectivity maintenance only ever happens between acquisition cycles.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │      ┌─────────────┐           ┌──────────────────────┐      │
//! │      │ Acquire     │           │ MaintainConnectivity │      │
//! │      │ every 4 s   │           │ every 30 s           │      │
//! │      └──────┬──────┘           └──────────┬───────────┘      │
//! │             ▼                             ▼                  │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate (main loop)             │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │                MonitorService.run_cycle()                    │
//! │                ConnectivityPort.poll()                       │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use crate::app::ports::{Job, SchedulerDelegate};
use log::info;

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A periodic job entry.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    /// Human-readable label for logs.
    pub label: &'static str,
    pub job: Job,
    pub interval_ms: u32,
    /// Fire on the first tick instead of one interval later.
    pub immediate: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules (stack-allocated).
const MAX_SCHEDULES: usize = 4;

/// The scheduler engine.
///
/// Decoupled from the jobs themselves: when a schedule fires it invokes
/// the [`SchedulerDelegate`] callback.
pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone, Copy)]
struct ScheduleEntry {
    schedule: Schedule,
    /// Uptime of the first tick seen or of the last fire.
    anchor_ms: Option<u64>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None; MAX_SCHEDULES],
        }
    }

    /// The standard HealthMon job table.
    pub fn with_monitor_jobs(poll_interval_ms: u32, connectivity_interval_ms: u32) -> Self {
        let mut sched = Self::new();
        sched.add(Schedule {
            label: "acquire",
            job: Job::Acquire,
            interval_ms: poll_interval_ms,
            immediate: true,
        });
        sched.add(Schedule {
            label: "wifi-maintenance",
            job: Job::MaintainConnectivity,
            interval_ms: connectivity_interval_ms,
            immediate: false,
        });
        sched
    }

    /// Add a schedule.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule) -> Option<usize> {
        let (i, slot) = self
            .schedules
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())?;
        info!("Scheduler: added '{}' at slot {}", schedule.label, i);
        *slot = Some(ScheduleEntry {
            schedule,
            anchor_ms: None,
        });
        Some(i)
    }

    /// Poll the scheduler at monotonic time `now_ms`.
    ///
    /// Due jobs are dispatched in slot order, one after another.  A job
    /// that overran its period fires once, not once per missed period.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.schedules.iter_mut().flatten() {
            let due = match entry.anchor_ms {
                None if entry.schedule.immediate => true,
                None => {
                    entry.anchor_ms = Some(now_ms);
                    false
                }
                Some(anchor) => {
                    now_ms.saturating_sub(anchor) >= u64::from(entry.schedule.interval_ms)
                }
            };
            if due {
                entry.anchor_ms = Some(now_ms);
                delegate.on_schedule_fired(entry.schedule.job);
            }
        }
    }

    /// Milliseconds until the next job is due, for sleeping between polls.
    /// `None` if nothing is scheduled.
    pub fn next_due_in(&self, now_ms: u64) -> Option<u64> {
        self.schedules
            .iter()
            .flatten()
            .map(|e| match e.anchor_ms {
                None => 0,
                Some(anchor) => {
                    (anchor + u64::from(e.schedule.interval_ms)).saturating_sub(now_ms)
                }
            })
            .min()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
