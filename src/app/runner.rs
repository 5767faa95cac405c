//! Main-loop glue: turns scheduler fires into monitor work.
//!
//! [`MonitorRunner`] owns the [`MonitorService`] together with every
//! adapter it needs and implements [`SchedulerDelegate`].  Each fire runs
//! to completion before the scheduler looks at the next job, so an
//! acquisition cycle and a connectivity check never interleave.
//!
//! Jobs read the clock themselves: an acquisition cycle can block on the
//! remote service for up to its timeout, and the tick time is stale by
//! then.

use log::warn;

use crate::adapters::wifi::ConnectivityPort;
use crate::scheduler::Scheduler;

use super::ports::{
    AlertPort, ClockPort, DisplayPort, EventSink, Job, PredictionPort, SchedulerDelegate,
    SensorPort,
};
use super::service::MonitorService;

pub struct MonitorRunner<H, P, C, D, S, T> {
    pub service: MonitorService,
    pub hw: H,
    pub predictor: P,
    pub net: C,
    pub display: D,
    pub sink: S,
    pub clock: T,
}

impl<H, P, C, D, S, T> MonitorRunner<H, P, C, D, S, T>
where
    H: SensorPort + AlertPort,
    P: PredictionPort,
    C: ConnectivityPort,
    D: DisplayPort,
    S: EventSink,
    T: ClockPort,
{
    pub fn new(
        service: MonitorService,
        hw: H,
        predictor: P,
        net: C,
        display: D,
        sink: S,
        clock: T,
    ) -> Self {
        Self {
            service,
            hw,
            predictor,
            net,
            display,
            sink,
            clock,
        }
    }

    /// Drive outputs to Normal and make the first association attempt.
    /// A failed attempt leaves the monitor running offline; the
    /// maintenance job keeps retrying.
    pub fn start(&mut self) {
        self.service.start(&mut self.hw, &mut self.sink);
        if let Err(e) = self.net.connect(self.clock.uptime_ms()) {
            warn!("Starting offline: {}", e);
        }
    }

    /// Run whatever `scheduler` has due now.
    pub fn poll(&mut self, scheduler: &mut Scheduler) {
        scheduler.tick(self.clock.uptime_ms(), self);
    }

    /// Milliseconds the caller may sleep before the next job is due.
    pub fn idle_for(&self, scheduler: &Scheduler) -> Option<u64> {
        scheduler.next_due_in(self.clock.uptime_ms())
    }
}

impl<H, P, C, D, S, T> SchedulerDelegate for MonitorRunner<H, P, C, D, S, T>
where
    H: SensorPort + AlertPort,
    P: PredictionPort,
    C: ConnectivityPort,
    D: DisplayPort,
    S: EventSink,
    T: ClockPort,
{
    fn on_schedule_fired(&mut self, job: Job) {
        match job {
            Job::Acquire => {
                let connected = self.net.is_connected();
                self.service.run_cycle(
                    &self.clock,
                    &mut self.hw,
                    &mut self.predictor,
                    connected,
                    &mut self.display,
                    &mut self.sink,
                );
            }
            Job::MaintainConnectivity => {
                self.net.poll(self.clock.uptime_ms());
                if !self.net.is_connected() {
                    warn!("WiFi down; remote assessment suspended");
                }
            }
        }
    }
}
