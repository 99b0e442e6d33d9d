// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Data model shared by the executor, scheduler, log and aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One named RPC call in the call plan.
///
/// `name` is the aggregation key; `method` is what goes on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDescriptor {
    /// Label used in the results log and statistics.
    pub name: String,
    /// JSON-RPC method identifier.
    pub method: String,
    /// JSON-RPC parameters, sent verbatim.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl CallDescriptor {
    /// Create a new descriptor.
    pub fn new(
        name: impl Into<String>,
        method: impl Into<String>,
        params: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            method: method.into(),
            params,
        }
    }
}

/// Result of a single probe: a measured duration or an error description,
/// never both and never neither.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    /// The call returned HTTP 200 with a body free of a top-level `error`.
    Success {
        /// Wall-clock time from issuing the request to receiving the full body.
        duration: Duration,
    },
    /// The call failed at the transport or protocol level. Failed calls
    /// carry no duration.
    Failure {
        /// Human-readable description of the failure.
        error: String,
    },
}

impl ProbeResult {
    /// Build a failure from anything displayable.
    pub fn failure(error: impl ToString) -> Self {
        Self::Failure {
            error: error.to_string(),
        }
    }

    /// Whether the probe succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Duration in seconds, present only on success.
    pub fn duration_secs(&self) -> Option<f64> {
        match self {
            Self::Success { duration } => Some(duration.as_secs_f64()),
            Self::Failure { .. } => None,
        }
    }

    /// Error description, present only on failure.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

/// A recorded probe. Immutable once appended to the results log.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    /// When the outcome was recorded.
    pub timestamp: DateTime<Utc>,
    /// Call descriptor name the probe was issued for.
    pub method_name: String,
    /// Duration or error.
    pub result: ProbeResult,
}

impl ProbeOutcome {
    /// Stamp a result with the current time.
    pub fn now(method_name: impl Into<String>, result: ProbeResult) -> Self {
        Self {
            timestamp: Utc::now(),
            method_name: method_name.into(),
            result,
        }
    }
}

/// Latency summary for one method, in whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodStatistics {
    /// Call descriptor name.
    pub method_name: String,
    /// floor(max * 1000)
    pub max_ms: u64,
    /// floor(min * 1000)
    pub min_ms: u64,
    /// floor(mean * 1000)
    pub avg_ms: u64,
    /// Number of successful probes the figures were computed from.
    pub samples: usize,
}

impl MethodStatistics {
    /// Reduce durations (in seconds) to millisecond statistics.
    ///
    /// Values are truncated, not rounded. Returns `None` for an empty sample
    /// set so that methods without a single success produce no row.
    pub fn from_samples(method_name: impl Into<String>, durations: &[f64]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }

        let max = durations.iter().copied().fold(f64::MIN, f64::max);
        let min = durations.iter().copied().fold(f64::MAX, f64::min);
        let mean = durations.iter().sum::<f64>() / durations.len() as f64;

        Some(Self {
            method_name: method_name.into(),
            max_ms: to_millis(max),
            min_ms: to_millis(min),
            avg_ms: to_millis(mean),
            samples: durations.len(),
        })
    }
}

fn to_millis(secs: f64) -> u64 {
    (secs * 1000.0).floor() as u64
}
