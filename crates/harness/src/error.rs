// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors that stop a run.
//!
//! Probe failures are never errors at this level; they are recorded as
//! outcomes. What remains here is the log or an output file becoming
//! unusable, and the HTTP client failing to build.

use thiserror::Error;

/// Fatal harness errors.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Filesystem error on the results log or an output file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited file could not be written or read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP client construction failed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
