//! Budget and cap limits injected into the orchestrator.

use serde::{Deserialize, Serialize};

use super::session::Depth;

/// Per-depth cap on how many endpoints are handed to agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCaps {
    /// Cap for shallow sessions.
    pub shallow: usize,
    /// Cap for standard sessions.
    pub standard: usize,
    /// Cap for deep sessions.
    pub deep: usize,
    /// Cap for regression sessions.
    pub regression: usize,
    /// Cap for semantic sessions.
    pub semantic: usize,
}

impl Default for EndpointCaps {
    fn default() -> Self {
        Self {
            shallow: 5,
            standard: 10,
            deep: 25,
            regression: 15,
            semantic: 10,
        }
    }
}

impl EndpointCaps {
    /// Cap for the given depth.
    pub fn cap_for(&self, depth: Depth) -> usize {
        match depth {
            Depth::Shallow => self.shallow,
            Depth::Standard => self.standard,
            Depth::Deep => self.deep,
            Depth::Regression => self.regression,
            Depth::Semantic => self.semantic,
        }
    }
}

/// Cost and time ceilings for the orchestrator.
///
/// Injected configuration, not hard-coded policy: callers tune these per
/// project via the config file or environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    /// Hard cost ceiling in USD; sessions finalize partial at or above it.
    pub max_cost_usd: f64,

    /// Soft threshold in USD at which a warning is logged.
    pub warn_cost_usd: f64,

    /// Per-depth endpoint caps.
    #[serde(default)]
    pub endpoint_caps: EndpointCaps,

    /// Wall-clock ceiling in minutes measured from orchestrator creation.
    pub session_timeout_minutes: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_cost_usd: 5.0,
            warn_cost_usd: 3.0,
            endpoint_caps: EndpointCaps::default(),
            session_timeout_minutes: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_by_depth() {
        let caps = EndpointCaps::default();
        assert_eq!(caps.cap_for(Depth::Shallow), 5);
        assert_eq!(caps.cap_for(Depth::Deep), 25);
        assert!(caps.cap_for(Depth::Shallow) < caps.cap_for(Depth::Deep));
    }

    #[test]
    fn test_default_limits_sane() {
        let limits = Limits::default();
        assert!(limits.warn_cost_usd < limits.max_cost_usd);
        assert!(limits.session_timeout_minutes > 0);
    }
}
