// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-method latency statistics computed from a results log.
//!
//! Aggregation is a pure function of the log contents: failed probes and
//! unreadable rows are skipped, and methods appear in the order they were
//! first seen in the log.

use crate::error::Result;
use crate::log::RESULTS_HEADER;
use latency_probe_core::MethodStatistics;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Header row of the statistics file.
pub const STATISTICS_HEADER: [&str; 4] = ["method", "max_time", "min_time", "avg_time(ms)"];

#[derive(Debug, Deserialize)]
struct LogRow {
    method: String,
    duration: Option<String>,
}

/// Parse a duration column. Empty, negative and non-finite values do not
/// count; zero does.
fn parse_duration(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
}

/// Aggregate a results log read from `reader`.
pub fn aggregate<R: Read>(reader: R) -> Result<Vec<MethodStatistics>> {
    let mut reader = csv::Reader::from_reader(reader);

    let mut index: HashMap<String, usize> = HashMap::new();
    let mut samples: Vec<(String, Vec<f64>)> = Vec::new();
    let mut skipped = 0usize;

    for record in reader.deserialize::<LogRow>() {
        let row = match record {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                debug!(error = %e, "Skipping unreadable results row");
                continue;
            }
        };

        let slot = match index.get(&row.method) {
            Some(&slot) => slot,
            None => {
                index.insert(row.method.clone(), samples.len());
                samples.push((row.method, Vec::new()));
                samples.len() - 1
            }
        };

        match row.duration.as_deref().map(parse_duration) {
            Some(Some(secs)) => samples[slot].1.push(secs),
            Some(None) => {
                skipped += 1;
                debug!(method = %samples[slot].0, "Skipping row with unparseable duration");
            }
            None => {}
        }
    }

    if skipped > 0 {
        debug!(skipped, "Aggregation skipped malformed rows");
    }

    Ok(samples
        .into_iter()
        .filter_map(|(method, durations)| MethodStatistics::from_samples(method, &durations))
        .collect())
}

/// Aggregate the results log at `path`.
pub fn aggregate_file(path: impl AsRef<Path>) -> Result<Vec<MethodStatistics>> {
    aggregate(File::open(path)?)
}

/// Write statistics as CSV, one row per method.
pub fn write_statistics<W: Write>(writer: W, statistics: &[MethodStatistics]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(STATISTICS_HEADER)?;

    for stats in statistics {
        writer.write_record([
            stats.method_name.clone(),
            stats.max_ms.to_string(),
            stats.min_ms.to_string(),
            stats.avg_ms.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write statistics to a file, replacing any previous content.
pub fn write_statistics_file(
    path: impl AsRef<Path>,
    statistics: &[MethodStatistics],
) -> Result<()> {
    write_statistics(File::create(path)?, statistics)
}

/// Check whether the file at `path` starts with the results log header.
pub fn has_results_header(path: impl AsRef<Path>) -> Result<bool> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.headers()?.iter().eq(RESULTS_HEADER))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
timestamp,method,duration,error
2025-03-01T12:00:00Z,balance,0.5678,
2025-03-01T12:00:01Z,block,,HTTP 500 Internal Server Error: oops
2025-03-01T12:00:02Z,balance,0.1234,
2025-03-01T12:00:03Z,head,0.2,
2025-03-01T12:00:04Z,block,,\"error response: {\"\"error\"\":{\"\"code\"\":-1}}\"
";

    #[test]
    fn test_aggregate_truncates_and_orders_by_first_seen() {
        let stats = aggregate(LOG.as_bytes()).unwrap();

        let names: Vec<_> = stats.iter().map(|s| s.method_name.as_str()).collect();
        assert_eq!(names, vec!["balance", "head"]);

        assert_eq!(stats[0].max_ms, 567);
        assert_eq!(stats[0].min_ms, 123);
        assert_eq!(stats[0].avg_ms, 345);
        assert_eq!(stats[1].max_ms, 200);
    }

    #[test]
    fn test_method_with_only_failures_is_omitted() {
        let stats = aggregate(LOG.as_bytes()).unwrap();
        assert!(stats.iter().all(|s| s.method_name != "block"));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let first = aggregate(LOG.as_bytes()).unwrap();
        let second = aggregate(LOG.as_bytes()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_garbage_rows_do_not_abort_aggregation() {
        let log = "\
timestamp,method,duration,error
t1,ping,not-a-number,
t2,ping,0.01,
t3,ping,-1,
t4,ping,NaN,
t5,ping,0.03,,extra-column
t6,ping,0.02,
";
        let stats = aggregate(log.as_bytes()).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].samples, 2);
        assert_eq!(stats[0].max_ms, 20);
        assert_eq!(stats[0].min_ms, 10);
    }

    #[test]
    fn test_zero_duration_is_a_sample() {
        let log = "timestamp,method,duration,error\nt1,ping,0.0,\n";
        let stats = aggregate(log.as_bytes()).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].max_ms, 0);
    }

    #[test]
    fn test_header_only_log_yields_nothing() {
        let stats = aggregate("timestamp,method,duration,error\n".as_bytes()).unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn test_write_statistics_format() {
        let stats = aggregate(LOG.as_bytes()).unwrap();
        let mut out = Vec::new();
        write_statistics(&mut out, &stats).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "method,max_time,min_time,avg_time(ms)\nbalance,567,123,345\nhead,200,200,200\n"
        );
    }

    #[test]
    fn test_results_header_detection() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.csv");
        let statistics = dir.path().join("statistics.csv");
        std::fs::write(&results, LOG).unwrap();
        write_statistics_file(&statistics, &aggregate(LOG.as_bytes()).unwrap()).unwrap();

        assert!(has_results_header(&results).unwrap());
        assert!(!has_results_header(&statistics).unwrap());
    }
}
