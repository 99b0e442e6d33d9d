// Copyright 2025 Latency Probe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Probe execution.
//!
//! A probe is one JSON-RPC 2.0 call over HTTP POST. The executor never
//! returns an error: every transport or protocol failure is folded into
//! [`ProbeResult::Failure`] so the scheduler can record it and move on.

use crate::error::{HarnessError, Result};
use async_trait::async_trait;
use latency_probe_core::{HarnessConfig, ProbeResult};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

/// Something that can issue a single timed call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Probe: Send + Sync {
    /// Issue one call and classify its outcome.
    async fn execute(&self, method: &str, params: &Value) -> ProbeResult;
}

/// Build the JSON-RPC 2.0 request envelope.
pub fn request_body(method: &str, params: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1,
    })
}

/// JSON-RPC over HTTP POST against a fixed URL.
///
/// Idle connections are not kept, so every probe pays for its own
/// connection setup the way an independent client would.
#[derive(Debug, Clone)]
pub struct JsonRpcProbe {
    client: Client,
    url: String,
}

impl JsonRpcProbe {
    /// Create a probe for `url`. `timeout` bounds the whole request,
    /// `None` waits indefinitely.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build().map_err(HarnessError::Client)?,
            url: url.into(),
        })
    }

    /// Create a probe from the harness configuration.
    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Self::new(config.server_url.clone(), config.request_timeout())
    }

    /// Target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Probe for JsonRpcProbe {
    async fn execute(&self, method: &str, params: &Value) -> ProbeResult {
        let request = match self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&request_body(method, params))
            .build()
        {
            Ok(request) => request,
            Err(e) => return ProbeResult::failure(format!("failed to build request: {e}")),
        };

        let start = Instant::now();
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => return ProbeResult::failure(format!("transport error: {e}")),
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return ProbeResult::failure(format!("failed to read response body: {e}")),
        };
        let elapsed = start.elapsed();

        if status != StatusCode::OK {
            return ProbeResult::failure(format!("HTTP {status}: {text}"));
        }

        let payload: Value = match serde_json::from_str(&text) {
            Ok(payload) => payload,
            Err(e) => return ProbeResult::failure(format!("invalid JSON response: {e}")),
        };

        let Some(object) = payload.as_object() else {
            return ProbeResult::failure(format!("unexpected response shape: {payload}"));
        };

        if object.contains_key("error") {
            return ProbeResult::failure(format!("error response: {payload}"));
        }

        ProbeResult::Success { duration: elapsed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_is_jsonrpc_2() {
        let body = request_body("eth_getBalance", &json!(["0xabc", "latest"]));
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "eth_getBalance",
                "params": ["0xabc", "latest"],
                "id": 1
            })
        );
    }

    #[test]
    fn test_from_config_uses_server_url() {
        let config = HarnessConfig {
            server_url: "http://localhost:8545/".to_string(),
            ..HarnessConfig::default()
        };
        let probe = JsonRpcProbe::from_config(&config).unwrap();
        assert_eq!(probe.url(), "http://localhost:8545/");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_reported_not_raised() {
        // Port 9 (discard) is not expected to accept HTTP on loopback.
        let probe = JsonRpcProbe::new("http://127.0.0.1:9/", Some(Duration::from_secs(5))).unwrap();
        let result = probe.execute("ping", &json!({})).await;

        assert!(result.duration_secs().is_none());
        assert!(result.error().unwrap().starts_with("transport error"));
    }
}
