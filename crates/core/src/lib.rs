// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for the latency-probe harness.
//!
//! This crate holds everything the measurement harness and the CLI share:
//!
//! - [`types`] - call descriptors, probe outcomes and per-method statistics
//! - [`plan`] - loading the ordered call plan from disk
//! - [`config`] - the layered [`HarnessConfig`] built once at startup

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod plan;
pub mod types;

pub use config::{ConfigurationError, HarnessConfig};
pub use plan::{CallPlan, PlanError};
pub use types::{CallDescriptor, MethodStatistics, ProbeOutcome, ProbeResult};
