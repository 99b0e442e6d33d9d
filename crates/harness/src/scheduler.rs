// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run scheduling.
//!
//! A run is a sequence of passes over the call plan. Calls never overlap:
//! each probe is awaited before the next one starts, separated by the call
//! delay, and passes are separated by the pass interval.
//!
//! The deadline is only checked before a pass starts, so a pass that begins
//! before the deadline always completes.
//!
//! ```text
//! deadline = start + total_duration
//! while now < deadline:
//!     for call in plan: probe, record, sleep(call_delay)
//!     flush
//!     sleep(pass_interval)
//! ```

use crate::error::Result;
use crate::executor::Probe;
use crate::log::ResultSink;
use chrono::{DateTime, Utc};
use latency_probe_core::{CallPlan, HarnessConfig, ProbeOutcome, ProbeResult};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Timing parameters of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSchedule {
    /// Wall-clock budget; no new pass starts once it is spent.
    pub total_duration: Duration,
    /// Pause after each completed pass.
    pub pass_interval: Duration,
    /// Pause after each call.
    pub call_delay: Duration,
    /// Stop after this many passes even if time remains.
    pub max_passes: Option<u32>,
}

impl RunSchedule {
    /// Take timing parameters from the harness configuration.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            total_duration: config.run_duration(),
            pass_interval: config.pass_interval(),
            call_delay: config.call_delay(),
            max_passes: config.max_passes,
        }
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Completed passes.
    pub passes: u32,
    /// Probes issued (and rows recorded).
    pub probes: u64,
    /// Probes that failed.
    pub failures: u64,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Probes that returned a duration.
    pub fn successes(&self) -> u64 {
        self.probes - self.failures
    }
}

/// Drives passes of a [`Probe`] over a [`CallPlan`].
#[derive(Debug)]
pub struct Scheduler<P> {
    probe: P,
    schedule: RunSchedule,
}

impl<P: Probe> Scheduler<P> {
    /// Create a scheduler.
    pub fn new(probe: P, schedule: RunSchedule) -> Self {
        Self { probe, schedule }
    }

    /// Timing parameters in use.
    pub fn schedule(&self) -> &RunSchedule {
        &self.schedule
    }

    /// Run until the deadline (or pass cap) and record every outcome in `sink`.
    ///
    /// Probe failures are recorded and the run continues. Only a sink error
    /// ends the run early.
    pub async fn run<S>(&self, plan: &CallPlan, sink: &mut S) -> Result<RunSummary>
    where
        S: ResultSink + ?Sized,
    {
        let started_at = Utc::now();
        let deadline = Instant::now() + self.schedule.total_duration;

        info!(
            calls = plan.len(),
            total_duration = ?self.schedule.total_duration,
            pass_interval = ?self.schedule.pass_interval,
            call_delay = ?self.schedule.call_delay,
            max_passes = ?self.schedule.max_passes,
            "Starting latency run"
        );

        let mut passes = 0u32;
        let mut probes = 0u64;
        let mut failures = 0u64;

        while Instant::now() < deadline {
            passes += 1;
            debug!(pass = passes, "Starting pass");

            for call in plan {
                let result = self.probe.execute(&call.method, &call.params).await;
                match &result {
                    ProbeResult::Success { duration } => {
                        debug!(name = %call.name, method = %call.method, ?duration, "Probe succeeded");
                    }
                    ProbeResult::Failure { error } => {
                        failures += 1;
                        warn!(name = %call.name, method = %call.method, %error, "Probe failed");
                    }
                }

                sink.record(&ProbeOutcome::now(&call.name, result))?;
                probes += 1;

                pause(self.schedule.call_delay).await;
            }

            sink.flush()?;

            if self.schedule.max_passes == Some(passes) {
                debug!(passes, "Pass limit reached");
                break;
            }

            pause(self.schedule.pass_interval).await;
        }

        let summary = RunSummary {
            passes,
            probes,
            failures,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            passes = summary.passes,
            probes = summary.probes,
            failures = summary.failures,
            "Latency run finished"
        );

        Ok(summary)
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
