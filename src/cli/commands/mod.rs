//! CLI command implementations.
//!
//! Each command module exposes an `execute(args, json_mode)` entry point and
//! owns its own argument struct.

pub mod bugs;
pub mod create_bugs;
pub mod health;
pub mod report;
pub mod sessions;
pub mod test;
pub mod validate;

use std::sync::Arc;

use anyhow::Result;

use crate::application::{AgentRegistry, QaOrchestrator};
use crate::infrastructure::agents::HttpProbeAgent;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::store::FsQaStore;

/// Build an orchestrator wired to the project-local store and the built-in
/// behavioral probe.
pub(crate) fn build_orchestrator() -> Result<QaOrchestrator> {
    let config = ConfigLoader::load()?;
    let store = Arc::new(FsQaStore::new(&config.qa_root));
    let registry = AgentRegistry::new().with_agent(Arc::new(HttpProbeAgent::new()?));
    Ok(QaOrchestrator::new(config, registry, store))
}
