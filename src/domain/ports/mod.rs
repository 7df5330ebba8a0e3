//! Ports: traits at the seams between the orchestrator and the outside.

pub mod store;
pub mod test_agent;

pub use store::{BaselineStore, SessionStore};
pub use test_agent::{AgentContext, AgentError, AgentOutput, AgentRole, TestAgent};
