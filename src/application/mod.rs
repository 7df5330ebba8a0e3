//! Application layer: the orchestrator and its agent registry.

pub mod agent_registry;
pub mod orchestrator;

pub use agent_registry::AgentRegistry;
pub use orchestrator::QaOrchestrator;
