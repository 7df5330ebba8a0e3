//! Built-in behavioral agent: a plain HTTP probe.
//!
//! The probe sends one request per endpoint and grades the response. A 5xx
//! is a critical finding, a failed transport attempt (refused connection,
//! timeout, DNS) is a moderate one, anything else passes. Output goes
//! through the same normalization path as external agents.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::domain::models::{Depth, EndpointTarget};
use crate::domain::ports::{AgentContext, AgentError, AgentOutput, AgentRole, TestAgent};

/// HTTP probe implementing the behavioral role.
pub struct HttpProbeAgent {
    client: Client,
}

impl HttpProbeAgent {
    /// Build the probe with a pooled client.
    pub fn new() -> Result<Self, AgentError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AgentError::Invocation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Probe one endpoint, producing a finding JSON object when it misbehaves.
    async fn probe(
        &self,
        base_url: &str,
        endpoint: &EndpointTarget,
        timeout: Duration,
    ) -> Option<Value> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), endpoint.path);
        let method = Method::from_bytes(endpoint.method.as_bytes()).unwrap_or(Method::GET);

        let response = self
            .client
            .request(method, &url)
            .timeout(timeout)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status();
                debug!(%url, status = status.as_u16(), "endpoint probed");
                if status.is_server_error() {
                    Some(json!({
                        "severity": "critical",
                        "category": "behavioral",
                        "test_type": "behavioral",
                        "endpoint": endpoint.path,
                        "title": format!("{} {} returned {}", endpoint.method, endpoint.path, status.as_u16()),
                        "description": "Endpoint responded with a server error.",
                        "expected": {"status": "non-5xx"},
                        "actual": {"status": status.as_u16()},
                    }))
                } else {
                    None
                }
            }
            Err(e) => {
                debug!(%url, error = %e, "endpoint unreachable");
                Some(json!({
                    "severity": "moderate",
                    "category": "behavioral",
                    "test_type": "behavioral",
                    "endpoint": endpoint.path,
                    "title": format!("{} {} unreachable", endpoint.method, endpoint.path),
                    "description": "Request never completed.",
                    "expected": {"status": "any HTTP response"},
                    "actual": {"error": e.to_string()},
                }))
            }
        }
    }
}

#[async_trait]
impl TestAgent for HttpProbeAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Behavioral
    }

    #[instrument(skip_all, fields(session_id = %ctx.session_id, endpoints = ctx.endpoints.len()))]
    async fn run(&self, ctx: &AgentContext) -> Result<AgentOutput, AgentError> {
        if ctx.endpoints.is_empty() {
            return Ok(AgentOutput::ok(json!({
                "tests_run": 0,
                "tests_passed": 0,
                "tests_failed": 0,
                "findings": [],
            })));
        }

        let timeout = Duration::from_secs(ctx.timeout_seconds.max(1));
        let mut findings = Vec::new();
        let mut failed = 0u64;

        // Deep sessions double-check flaky endpoints with a second probe.
        let attempts = if ctx.depth == Depth::Deep { 2 } else { 1 };

        for endpoint in &ctx.endpoints {
            let mut finding = None;
            for _ in 0..attempts {
                finding = self.probe(&ctx.base_url, endpoint, timeout).await;
                if finding.is_none() {
                    break;
                }
            }
            if let Some(f) = finding {
                failed += 1;
                findings.push(f);
            }
        }

        let run = ctx.endpoints.len() as u64;
        Ok(AgentOutput::ok(json!({
            "tests_run": run,
            "tests_passed": run - failed,
            "tests_failed": failed,
            "findings": findings,
        })))
    }
}
