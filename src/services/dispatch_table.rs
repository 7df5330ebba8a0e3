//! Depth -> agent routing table.
//!
//! An explicit, injectable mapping interpreted by one dispatch loop, so new
//! depths or agent roles can be added without touching orchestrator control
//! flow.

use std::collections::HashMap;

use crate::domain::models::Depth;
use crate::domain::ports::AgentRole;

/// Ordered agent roles per depth.
///
/// Ordering matters: findings are aggregated in dispatch order, and for
/// `regression` depth the regression agent must run before the behavioral
/// agent so its suite can replace the endpoint set.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    table: HashMap<Depth, Vec<AgentRole>>,
}

impl Default for DispatchTable {
    fn default() -> Self {
        let mut table = HashMap::new();
        table.insert(Depth::Shallow, vec![AgentRole::Behavioral]);
        table.insert(
            Depth::Standard,
            vec![AgentRole::Behavioral, AgentRole::Contract],
        );
        table.insert(
            Depth::Deep,
            vec![
                AgentRole::Behavioral,
                AgentRole::Contract,
                AgentRole::Regression,
                AgentRole::Semantic,
            ],
        );
        table.insert(
            Depth::Regression,
            vec![AgentRole::Regression, AgentRole::Behavioral],
        );
        table.insert(Depth::Semantic, vec![AgentRole::Semantic]);
        Self { table }
    }
}

impl DispatchTable {
    /// Ordered roles for the given depth; empty for unmapped depths.
    pub fn roles_for(&self, depth: Depth) -> &[AgentRole] {
        self.table.get(&depth).map_or(&[], Vec::as_slice)
    }

    /// Replace the role list for one depth.
    pub fn with_roles(mut self, depth: Depth, roles: Vec<AgentRole>) -> Self {
        self.table.insert(depth, roles);
        self
    }
}
