// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Call plan loading.
//!
//! A call plan is a JSON array of `{ "name", "method", "params" }` records,
//! probed in file order on every pass.

use crate::types::CallDescriptor;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while loading a call plan.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan file could not be read
    #[error("Failed to read call plan {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The plan is not a JSON array of call descriptors
    #[error("Invalid call plan: {0}")]
    Parse(#[from] serde_json::Error),

    /// The plan contains no calls
    #[error("Call plan is empty")]
    Empty,
}

/// Result type for call plan operations.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Ordered, immutable list of calls to probe.
#[derive(Debug, Clone, PartialEq)]
pub struct CallPlan {
    calls: Vec<CallDescriptor>,
}

impl CallPlan {
    /// Build a plan from descriptors, rejecting an empty list.
    pub fn new(calls: Vec<CallDescriptor>) -> Result<Self> {
        if calls.is_empty() {
            return Err(PlanError::Empty);
        }

        let mut seen = HashSet::new();
        for call in &calls {
            if !seen.insert(call.name.as_str()) {
                warn!(name = %call.name, "Duplicate call name; statistics will merge these calls");
            }
        }

        Ok(Self { calls })
    }

    /// Parse a plan from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::new(serde_json::from_str(json)?)
    }

    /// Load a plan from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Calls in probe order.
    pub fn calls(&self) -> &[CallDescriptor] {
        &self.calls
    }

    /// Number of calls per pass.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Whether the plan has no calls. [`CallPlan::new`] rejects empty plans.
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

impl<'a> IntoIterator for &'a CallPlan {
    type Item = &'a CallDescriptor;
    type IntoIter = std::slice::Iter<'a, CallDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const PLAN: &str = r#"[
        {"name": "block", "method": "eth_blockNumber", "params": []},
        {"name": "balance", "method": "eth_getBalance", "params": ["0xabc", "latest"]}
    ]"#;

    #[test]
    fn test_plan_preserves_file_order() {
        let plan = CallPlan::from_json_str(PLAN).unwrap();
        let names: Vec<_> = plan.calls().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["block", "balance"]);
        assert_eq!(plan.calls()[1].params, json!(["0xabc", "latest"]));
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        assert!(matches!(
            CallPlan::from_json_str("[]"),
            Err(PlanError::Empty)
        ));
    }

    #[test]
    fn test_malformed_plan_is_rejected() {
        assert!(matches!(
            CallPlan::from_json_str(r#"{"name": "x"}"#),
            Err(PlanError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_names_are_allowed() {
        let plan = CallPlan::from_json_str(
            r#"[{"name": "a", "method": "m1"}, {"name": "a", "method": "m2"}]"#,
        )
        .unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(PLAN.as_bytes()).unwrap();

        let plan = CallPlan::from_path(file.path()).unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = CallPlan::from_path("/nonexistent/requests.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/requests.json"));
    }
}
