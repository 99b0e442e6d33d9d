// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Append-only results log.
//!
//! Every probe outcome becomes one row of `timestamp,method,duration,error`.
//! Rows are only ever appended; [`ResultSink::flush`] is called by the
//! scheduler after each pass so a crash loses at most the current pass.

use crate::error::{HarnessError, Result};
use chrono::SecondsFormat;
use latency_probe_core::ProbeOutcome;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Header row of the results log.
pub const RESULTS_HEADER: [&str; 4] = ["timestamp", "method", "duration", "error"];

/// Destination for probe outcomes.
pub trait ResultSink {
    /// Append one outcome.
    fn record(&mut self, outcome: &ProbeOutcome) -> Result<()>;

    /// Make everything recorded so far durable.
    fn flush(&mut self) -> Result<()>;
}

/// In-memory sink, mostly useful for tests and dry runs.
impl ResultSink for Vec<ProbeOutcome> {
    fn record(&mut self, outcome: &ProbeOutcome) -> Result<()> {
        self.push(outcome.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// CSV results log.
///
/// Durations are written in seconds; the `duration` column is empty for
/// failed probes and the `error` column is empty for successful ones.
pub struct CsvResultLog<W: Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl CsvResultLog<File> {
    /// Create (or truncate) the log file at `path` and write the header.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> CsvResultLog<W> {
    /// Wrap a writer and write the header row immediately.
    pub fn new(inner: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(RESULTS_HEADER)?;
        writer.flush()?;

        Ok(Self { writer, rows: 0 })
    }

    /// Number of outcomes recorded so far.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| HarnessError::Io(e.into_error()))
    }
}

impl<W: Write> ResultSink for CsvResultLog<W> {
    fn record(&mut self, outcome: &ProbeOutcome) -> Result<()> {
        let timestamp = outcome
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        let duration = outcome
            .result
            .duration_secs()
            .map(|secs| secs.to_string())
            .unwrap_or_default();
        let error = outcome.result.error().unwrap_or_default();

        self.writer.write_record([
            timestamp.as_str(),
            outcome.method_name.as_str(),
            duration.as_str(),
            error,
        ])?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
