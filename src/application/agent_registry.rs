//! Registry of pluggable test agents, keyed by role.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ports::{AgentRole, TestAgent};

/// Role -> agent lookup used by the dispatch loop.
///
/// An unregistered role is not an error: the orchestrator records it under
/// `skipped_reasons` and moves on.
#[derive(Default, Clone)]
pub struct AgentRegistry {
    agents: HashMap<AgentRole, Arc<dyn TestAgent>>,
}

impl AgentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent under its own role, replacing any previous one.
    pub fn register(&mut self, agent: Arc<dyn TestAgent>) {
        self.agents.insert(agent.role(), agent);
    }

    /// Builder-style registration.
    pub fn with_agent(mut self, agent: Arc<dyn TestAgent>) -> Self {
        self.register(agent);
        self
    }

    /// Look up the agent for a role.
    pub fn get(&self, role: AgentRole) -> Option<Arc<dyn TestAgent>> {
        self.agents.get(&role).cloned()
    }

    /// Roles with a registered agent.
    pub fn registered_roles(&self) -> Vec<AgentRole> {
        self.agents.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{AgentContext, AgentError, AgentOutput};
    use async_trait::async_trait;

    struct NoopAgent(AgentRole);

    #[async_trait]
    impl TestAgent for NoopAgent {
        fn role(&self) -> AgentRole {
            self.0
        }

        async fn run(&self, _ctx: &AgentContext) -> Result<AgentOutput, AgentError> {
            Ok(AgentOutput::ok(serde_json::json!({})))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry =
            AgentRegistry::new().with_agent(Arc::new(NoopAgent(AgentRole::Behavioral)));
        assert!(registry.get(AgentRole::Behavioral).is_some());
        assert!(registry.get(AgentRole::Contract).is_none());
        assert_eq!(registry.registered_roles(), vec![AgentRole::Behavioral]);
    }
}
