//! Scheduled JSON-RPC latency measurement.
//!
//! This crate repeatedly probes a fixed call plan against one endpoint,
//! logs every outcome as it happens and reduces the log to per-method
//! max/min/average latency.
//!
//! # Quick Start
//!
//! ```no_run
//! use latency_probe_core::{CallPlan, HarnessConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HarnessConfig::load(None)?;
//! let plan = CallPlan::from_path(&config.requests_file)?;
//!
//! let report = latency_probe_harness::run_and_write_all(&config, &plan).await?;
//! for stats in &report.statistics {
//!     println!("{}: avg {} ms", stats.method_name, stats.avg_ms);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`executor`] - issuing and timing a single probe
//! - [`scheduler`] - passes over the call plan on a fixed cadence
//! - [`log`] - the append-only results log
//! - [`stats`] - per-method statistics from a results log
//! - [`io`] - output directory layout
//! - [`markdown`] - markdown summary generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod executor;
pub mod io;
pub mod log;
pub mod markdown;
pub mod scheduler;
pub mod stats;

pub use error::{HarnessError, Result};
pub use executor::{JsonRpcProbe, Probe};
pub use io::OutputPaths;
pub use log::{CsvResultLog, ResultSink};
pub use scheduler::{RunSchedule, RunSummary, Scheduler};

use latency_probe_core::{CallPlan, HarnessConfig, MethodStatistics};
use std::path::Path;
use tracing::info;

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Run totals.
    pub summary: RunSummary,
    /// Per-method statistics, in first-seen order.
    pub statistics: Vec<MethodStatistics>,
    /// Where the output files were written.
    pub paths: OutputPaths,
}

/// Probe `plan` for the configured duration, then aggregate.
///
/// Writes to the configured output directory:
/// - `results.csv` - one row per probe, flushed after every pass
/// - `statistics.csv` - one row per method with at least one success
/// - `summary.md` - markdown summary
///
/// # Errors
///
/// Returns a [`HarnessError`] if the HTTP client cannot be built or an output
/// file cannot be written. Failed probes are not errors.
pub async fn run_and_write_all(config: &HarnessConfig, plan: &CallPlan) -> Result<RunReport> {
    let paths = OutputPaths::new(&config.output_dir);
    paths.ensure_dir()?;

    let scheduler = Scheduler::new(
        JsonRpcProbe::from_config(config)?,
        RunSchedule::from_config(config),
    );

    let mut log = CsvResultLog::create(&paths.results)?;
    let summary = scheduler.run(plan, &mut log).await?;
    log.into_inner()?;
    info!(path = %paths.results.display(), "Results log closed");

    let statistics = aggregate_and_write(&paths.results, &paths.statistics)?;
    io::write_summary(
        &paths.summary,
        &markdown::generate_summary(&statistics, Some(&summary)),
    )?;

    Ok(RunReport {
        summary,
        statistics,
        paths,
    })
}

/// Aggregate an existing results log and write the statistics file.
///
/// Running this twice on an unchanged log produces identical output.
pub fn aggregate_and_write(
    results: impl AsRef<Path>,
    statistics_out: impl AsRef<Path>,
) -> Result<Vec<MethodStatistics>> {
    let statistics = stats::aggregate_file(results)?;
    stats::write_statistics_file(&statistics_out, &statistics)?;
    info!(
        methods = statistics.len(),
        path = %statistics_out.as_ref().display(),
        "Statistics written"
    );
    Ok(statistics)
}
