//! Test-agent port: the uniform contract every collaborator implements.
//!
//! The orchestrator depends only on this shape, never on agent internals.
//! Agent output is an opaque JSON map; the orchestrator reads a small set
//! of well-known optional keys (`tests_run`, `tests_passed`, `tests_failed`,
//! `findings`, `issues`, `regression_suite`, `cost_usd`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::{Depth, EndpointTarget};

/// Role of a test agent within the dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    /// HTTP-probing behavioral tester.
    Behavioral,
    /// OpenAPI/code-scanning contract validator.
    Contract,
    /// Git-diff-based regression scanner.
    Regression,
    /// LLM-backed semantic tester.
    Semantic,
}

impl AgentRole {
    /// Stable string name used in `skipped_reasons` keys and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Behavioral => "behavioral",
            Self::Contract => "contract",
            Self::Regression => "regression",
            Self::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything an agent needs to run against the system under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    /// Session the invocation belongs to.
    pub session_id: String,

    /// Base URL of the system under test.
    pub base_url: String,

    /// Endpoints to probe, already truncated to the per-depth cap.
    pub endpoints: Vec<EndpointTarget>,

    /// Source files under test.
    pub target_files: Vec<String>,

    /// Session depth, so agents can scale their own effort.
    pub depth: Depth,

    /// When true, agents must not attempt to boot the system under test.
    pub skip_service_start: bool,

    /// Unified git diff, if the caller supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_diff: Option<String>,

    /// Free-form spec/issue text, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_text: Option<String>,

    /// Per-request timeout budget in seconds.
    pub timeout_seconds: u64,
}

/// Raw result of one agent invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Whether the agent itself considers the run usable.
    pub success: bool,

    /// Opaque output map; only well-known keys are read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,

    /// Agent-reported error when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AgentOutput {
    /// Successful output wrapping a JSON map.
    pub fn ok(output: serde_json::Value) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
        }
    }

    /// Agent-level failure with a reason.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }

    /// Read a numeric well-known key, defaulting to 0.
    pub fn count(&self, key: &str) -> u64 {
        self.output
            .as_ref()
            .and_then(|o| o.get(key))
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0)
    }

    /// Raw `findings` array, if present.
    pub fn raw_findings(&self) -> Vec<serde_json::Value> {
        self.raw_array("findings")
    }

    /// Raw semantic `issues` array, if present.
    pub fn raw_issues(&self) -> Vec<serde_json::Value> {
        self.raw_array("issues")
    }

    /// Cost attributed to the invocation by the agent, in USD.
    pub fn cost_usd(&self) -> f64 {
        self.output
            .as_ref()
            .and_then(|o| o.get("cost_usd"))
            .and_then(serde_json::Value::as_f64)
            .unwrap_or(0.0)
    }

    /// `regression_suite.must_test` + `regression_suite.should_test`
    /// endpoint paths, in that order.
    pub fn regression_suite_paths(&self) -> Vec<String> {
        let Some(suite) = self.output.as_ref().and_then(|o| o.get("regression_suite")) else {
            return Vec::new();
        };
        let mut paths = Vec::new();
        for key in ["must_test", "should_test"] {
            if let Some(list) = suite.get(key).and_then(serde_json::Value::as_array) {
                paths.extend(
                    list.iter()
                        .filter_map(serde_json::Value::as_str)
                        .map(ToString::to_string),
                );
            }
        }
        paths
    }

    fn raw_array(&self, key: &str) -> Vec<serde_json::Value> {
        self.output
            .as_ref()
            .and_then(|o| o.get(key))
            .and_then(serde_json::Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

/// Why an agent invocation produced no usable output.
///
/// Every variant is recovered locally: the reason lands in the session's
/// `skipped_reasons` and the remaining agents still run.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent not registered: {0}")]
    NotRegistered(AgentRole),

    #[error("agent reported failure: {0}")]
    Failed(String),

    #[error("agent invocation error: {0}")]
    Invocation(String),
}

/// Trait for pluggable test agents.
///
/// Implementations must be cheap to share (`Send + Sync`); the orchestrator
/// invokes them sequentially within one session.
#[async_trait]
pub trait TestAgent: Send + Sync {
    /// The role this agent fills in the dispatch table.
    fn role(&self) -> AgentRole;

    /// Run the agent against the given context.
    ///
    /// Errors are recorded per-agent and never abort the session.
    async fn run(&self, ctx: &AgentContext) -> Result<AgentOutput, AgentError>;
}
