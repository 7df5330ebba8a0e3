//! Application configuration model.

use serde::{Deserialize, Serialize};

use super::limits::Limits;
use super::session::Depth;

/// Fixed per-depth cost/time estimate used for budget downgrades.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthEstimate {
    /// Estimated cost of a session at this depth, in USD.
    pub cost_usd: f64,
    /// Estimated duration of a session at this depth, in minutes.
    pub minutes: u64,
}

/// Estimate tables for all depths; shallow cheapest, deep costliest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthEstimates {
    /// Shallow session estimate.
    pub shallow: DepthEstimate,
    /// Standard session estimate.
    pub standard: DepthEstimate,
    /// Deep session estimate.
    pub deep: DepthEstimate,
    /// Regression session estimate.
    pub regression: DepthEstimate,
    /// Semantic session estimate.
    pub semantic: DepthEstimate,
}

impl Default for DepthEstimates {
    fn default() -> Self {
        Self {
            shallow: DepthEstimate { cost_usd: 0.50, minutes: 2 },
            standard: DepthEstimate { cost_usd: 1.50, minutes: 5 },
            deep: DepthEstimate { cost_usd: 4.00, minutes: 15 },
            regression: DepthEstimate { cost_usd: 2.50, minutes: 8 },
            semantic: DepthEstimate { cost_usd: 1.00, minutes: 4 },
        }
    }
}

impl DepthEstimates {
    /// Estimate for the given depth.
    pub fn for_depth(&self, depth: Depth) -> DepthEstimate {
        match depth {
            Depth::Shallow => self.shallow,
            Depth::Standard => self.standard,
            Depth::Deep => self.deep,
            Depth::Regression => self.regression,
            Depth::Semantic => self.semantic,
        }
    }
}

/// Depth-selection policy knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Effective risk at or above which the base depth escalates one level.
    pub high_risk_threshold: f64,

    /// Substrings that mark a target file or endpoint path high-risk.
    pub high_risk_keywords: Vec<String>,

    /// Per-depth cost/time estimate tables.
    #[serde(default)]
    pub estimates: DepthEstimates,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            high_risk_threshold: 0.8,
            high_risk_keywords: [
                "auth", "login", "password", "payment", "billing", "security",
                "credential", "token", "session", "secret",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            estimates: DepthEstimates::default(),
        }
    }
}

/// Top-level configuration for the QA orchestrator.
///
/// Loaded hierarchically: programmatic defaults, then
/// `.swarm/qa/config.yaml`, then `QASWARM_`-prefixed environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaConfig {
    /// Project root; persisted state lives under `<qa_root>/.swarm/qa/`.
    pub qa_root: String,

    /// Default base URL of the system under test.
    pub base_url: String,

    /// Cost/time ceilings and endpoint caps.
    #[serde(default)]
    pub limits: Limits,

    /// Depth-selection policy.
    #[serde(default)]
    pub selector: SelectorConfig,

    /// Per-request timeout handed to agents, in seconds.
    pub agent_timeout_seconds: u64,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            qa_root: ".".to_string(),
            base_url: "http://localhost:3000".to_string(),
            limits: Limits::default(),
            selector: SelectorConfig::default(),
            agent_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimates_ordering() {
        let est = DepthEstimates::default();
        assert!(est.shallow.cost_usd < est.standard.cost_usd);
        assert!(est.standard.cost_usd < est.regression.cost_usd);
        assert!(est.regression.cost_usd < est.deep.cost_usd);
        assert!(est.shallow.minutes < est.deep.minutes);
    }

    #[test]
    fn test_default_keywords_include_auth() {
        let cfg = SelectorConfig::default();
        assert!(cfg.high_risk_keywords.iter().any(|k| k == "auth"));
        assert!(cfg.high_risk_keywords.iter().any(|k| k == "payment"));
    }
}
