//! QA orchestrator: session lifecycle, depth-based dispatch, budget
//! enforcement, aggregation, and persistence.
//!
//! One `test`/`validate_issue`/`health_check` call runs its full
//! dispatch-aggregate-persist sequence before returning. Agents are invoked
//! sequentially in dispatch-table order; a single agent's failure degrades
//! the session but never aborts it.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::errors::{QaError, QaResult};
use crate::domain::models::{
    BugInvestigation, Depth, EndpointTarget, Finding, QaConfig, QaContext, Session,
    SessionResult, SessionStatus, Severity, Trigger,
};
use crate::domain::ports::{
    AgentContext, AgentError, AgentOutput, AgentRole, SessionStore,
};
use crate::infrastructure::report;
use crate::services::{aggregator, DepthSelector, DispatchTable};

use super::agent_registry::AgentRegistry;

/// Well-known endpoints probed by `health_check`.
const HEALTH_ENDPOINTS: [&str; 4] = ["/health", "/healthz", "/readyz", "/api/health"];

/// How a session-machinery failure is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    /// Ad-hoc `test` flows finalize as `Blocked`.
    Block,
    /// Issue-validation flows finalize as `Failed`.
    Fail,
}

/// Top-level coordinator for QA sessions.
pub struct QaOrchestrator {
    config: QaConfig,
    selector: DepthSelector,
    dispatch: DispatchTable,
    registry: AgentRegistry,
    store: Arc<dyn SessionStore>,
    accumulated_cost: Mutex<f64>,
    created_at: DateTime<Utc>,
}

impl QaOrchestrator {
    /// Create an orchestrator with the default dispatch table.
    pub fn new(config: QaConfig, registry: AgentRegistry, store: Arc<dyn SessionStore>) -> Self {
        let selector = DepthSelector::new(config.selector.clone());
        Self {
            config,
            selector,
            dispatch: DispatchTable::default(),
            registry,
            store,
            accumulated_cost: Mutex::new(0.0),
            created_at: Utc::now(),
        }
    }

    /// Replace the dispatch table (for custom depth/role routing).
    pub fn with_dispatch_table(mut self, dispatch: DispatchTable) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Seed the accumulated cost, e.g. when resuming a budgeted run.
    pub async fn set_accumulated_cost(&self, cost_usd: f64) {
        *self.accumulated_cost.lock().await = cost_usd;
    }

    /// Cost attributed to this orchestrator so far, in USD.
    pub async fn accumulated_cost(&self) -> f64 {
        *self.accumulated_cost.lock().await
    }

    // -------------------------------------------------------------------------
    // Session-producing operations
    // -------------------------------------------------------------------------

    /// Run a QA session against a file path or a `/`-prefixed endpoint.
    pub async fn test(
        &self,
        target: &str,
        depth: Option<Depth>,
        trigger: Trigger,
        base_url: Option<String>,
        timeout_seconds: Option<u64>,
    ) -> QaResult<Session> {
        let context = self.build_context(target, base_url)?;
        self.run_session(context, trigger, depth, timeout_seconds, FailureMode::Block)
            .await
    }

    /// Run a QA session scoped to a feature/issue pair.
    ///
    /// Always triggered as post-verification; machinery failures finalize
    /// as `Failed` rather than `Blocked`.
    pub async fn validate_issue(
        &self,
        feature_id: &str,
        issue_number: u64,
        depth: Option<Depth>,
    ) -> QaResult<Session> {
        let mut context = QaContext::for_issue(feature_id, issue_number);
        context.base_url = Some(self.config.base_url.clone());
        self.run_session(
            context,
            Trigger::PostVerification,
            depth,
            None,
            FailureMode::Fail,
        )
        .await
    }

    /// Probe the well-known health endpoints at shallow depth.
    pub async fn health_check(&self, base_url: Option<String>) -> QaResult<Session> {
        let context = QaContext {
            target_endpoints: HEALTH_ENDPOINTS
                .iter()
                .map(|p| EndpointTarget::get(*p))
                .collect(),
            base_url: Some(base_url.unwrap_or_else(|| self.config.base_url.clone())),
            ..QaContext::default()
        };
        self.run_session(
            context,
            Trigger::UserCommand,
            Some(Depth::Shallow),
            None,
            FailureMode::Block,
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Read-only accessors over persisted state
    // -------------------------------------------------------------------------

    /// Load one session by id.
    pub fn get_session(&self, session_id: &str) -> QaResult<Option<Session>> {
        self.store.load_session(session_id)
    }

    /// Most recent sessions, newest first.
    pub fn list_sessions(&self, limit: usize) -> QaResult<Vec<Session>> {
        let mut sessions = Vec::new();
        for id in self.store.list_session_ids(limit)? {
            if let Some(session) = self.store.load_session(&id)? {
                sessions.push(session);
            }
        }
        Ok(sessions)
    }

    /// Findings across persisted sessions, optionally filtered by session
    /// id and/or minimum severity rank.
    pub fn get_findings(
        &self,
        session_id: Option<&str>,
        severity: Option<Severity>,
    ) -> QaResult<Vec<Finding>> {
        let sessions = match session_id {
            Some(id) => self
                .store
                .load_session(id)?
                .map(|s| vec![s])
                .ok_or_else(|| QaError::SessionNotFound(id.to_string()))?,
            None => self.list_sessions(usize::MAX)?,
        };

        let mut findings = Vec::new();
        for session in sessions {
            if let Some(result) = session.result {
                findings.extend(result.findings.into_iter().filter(|f| {
                    severity.is_none_or(|min| f.severity.rank() <= min.rank())
                }));
            }
        }
        Ok(findings)
    }

    /// Derive bug-investigation seeds from a session's findings at or above
    /// the severity threshold, and persist the companion bugs document.
    pub fn create_bug_investigations(
        &self,
        session_id: &str,
        severity_threshold: Severity,
    ) -> QaResult<Vec<BugInvestigation>> {
        let session = self
            .store
            .load_session(session_id)?
            .ok_or_else(|| QaError::SessionNotFound(session_id.to_string()))?;

        let findings: Vec<Finding> = session
            .result
            .as_ref()
            .map(|r| {
                r.findings_at_or_above(severity_threshold)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let suffix = session.id_suffix().to_string();
        let bugs: Vec<BugInvestigation> = findings
            .into_iter()
            .enumerate()
            .map(|(i, finding)| BugInvestigation {
                bug_id: format!("qa-bug-{suffix}-{:03}", i + 1),
                session_id: session_id.to_string(),
                finding,
            })
            .collect();

        if !bugs.is_empty() {
            let doc = report::render_bugs_doc(&session, &bugs);
            self.store.write_bugs_doc(session_id, &doc)?;
        }

        info!(session_id, bugs = bugs.len(), "bug investigations created");
        Ok(bugs)
    }

    // -------------------------------------------------------------------------
    // Core session flow
    // -------------------------------------------------------------------------

    /// Full create-guard-dispatch-aggregate-persist sequence for one session.
    async fn run_session(
        &self,
        context: QaContext,
        trigger: Trigger,
        override_depth: Option<Depth>,
        timeout_seconds: Option<u64>,
        failure_mode: FailureMode,
    ) -> QaResult<Session> {
        let limits = &self.config.limits;
        let accumulated = self.accumulated_cost().await;
        let remaining_cost = (limits.max_cost_usd - accumulated).max(0.0);
        let elapsed_minutes = self.elapsed_minutes();
        let remaining_minutes = limits.session_timeout_minutes.saturating_sub(elapsed_minutes);

        let depth = self.selector.select_depth(
            trigger,
            &context,
            0.0,
            Some(remaining_minutes),
            Some(remaining_cost),
            override_depth,
        );

        let mut session = Session::new(trigger, depth, context);
        info!(
            session_id = %session.session_id,
            %trigger,
            %depth,
            "session created"
        );
        self.store.save_session(&session)?;

        // Budget/timeout guards: finalize immediately, zero agents invoked.
        if accumulated >= limits.max_cost_usd {
            session.complete_partial(SessionResult::partial(format!(
                "cost_limit: exceeded max_cost_usd ({:.2}) before starting",
                limits.max_cost_usd
            )));
            return self.finalize(session);
        }
        if elapsed_minutes >= limits.session_timeout_minutes {
            session.complete_partial(SessionResult::partial(format!(
                "timeout: exceeded session_timeout_minutes ({}) before starting",
                limits.session_timeout_minutes
            )));
            return self.finalize(session);
        }

        if accumulated >= limits.warn_cost_usd {
            warn!(
                session_id = %session.session_id,
                accumulated_cost = accumulated,
                warn_cost_usd = limits.warn_cost_usd,
                "cost warn threshold reached"
            );
        }

        session.mark_running();
        self.store.save_session(&session)?;

        let timeout = timeout_seconds.unwrap_or(self.config.agent_timeout_seconds);
        match self.dispatch_agents(&mut session, timeout).await {
            Ok((outputs, skipped, cost)) => {
                session.cost_usd = cost;
                *self.accumulated_cost.lock().await += cost;
                let result = aggregator::aggregate(&session.session_id, &outputs, skipped);
                session.complete(result);
            }
            Err(e) => {
                warn!(session_id = %session.session_id, error = %e, "session machinery failed");
                match failure_mode {
                    FailureMode::Block => session.block(e.to_string()),
                    FailureMode::Fail => session.fail(e.to_string()),
                }
            }
        }

        self.finalize(session)
    }

    /// Route to agents per the dispatch table, isolating each invocation.
    ///
    /// Returns successful outputs in dispatch order, per-agent skip
    /// reasons, and the total agent-reported cost.
    #[allow(clippy::type_complexity)]
    async fn dispatch_agents(
        &self,
        session: &mut Session,
        timeout_seconds: u64,
    ) -> QaResult<(Vec<(AgentRole, AgentOutput)>, BTreeMap<String, String>, f64)> {
        let depth = session.depth;
        let cap = self.config.limits.endpoint_caps.cap_for(depth);

        let mut endpoints: Vec<EndpointTarget> = session
            .context
            .target_endpoints
            .iter()
            .take(cap)
            .cloned()
            .collect();

        let mut outputs = Vec::new();
        let mut skipped = BTreeMap::new();
        let mut cost = 0.0;

        for &role in self.dispatch.roles_for(depth) {
            let ctx = AgentContext {
                session_id: session.session_id.clone(),
                base_url: session
                    .context
                    .base_url
                    .clone()
                    .unwrap_or_else(|| self.config.base_url.clone()),
                endpoints: endpoints.clone(),
                target_files: session.context.target_files.clone(),
                depth,
                skip_service_start: true,
                git_diff: session.context.git_diff.clone(),
                spec_text: session.context.spec_text.clone(),
                timeout_seconds,
            };

            let output = match self.invoke_agent(role, &ctx).await {
                Ok(output) => output,
                Err(e) => {
                    debug!(session_id = %session.session_id, agent = %role, reason = %e, "agent skipped");
                    skipped.insert(role.as_str().to_string(), e.to_string());
                    continue;
                }
            };

            cost += output.cost_usd();

            // Regression depth: the regression suite replaces the endpoint
            // set for the subsequent behavioral run.
            if depth == Depth::Regression && role == AgentRole::Regression {
                let suite = output.regression_suite_paths();
                if !suite.is_empty() {
                    endpoints = suite
                        .iter()
                        .map(|p| EndpointTarget::get(p.clone()))
                        .take(cap)
                        .collect();
                    self.append_derived_endpoints(&mut session.context, &endpoints);
                    // The context grew mid-dispatch; snapshot it before the
                    // behavioral rerun so a crash cannot lose the derived set.
                    self.store.save_session(session)?;
                    info!(
                        session_id = %session.session_id,
                        endpoints = endpoints.len(),
                        "endpoint set replaced by regression suite"
                    );
                }
            }

            outputs.push((role, output));
        }

        Ok((outputs, skipped, cost))
    }

    /// Invoke one agent, mapping missing registration and agent-reported
    /// failure into typed [`AgentError`]s.
    async fn invoke_agent(
        &self,
        role: AgentRole,
        ctx: &AgentContext,
    ) -> Result<AgentOutput, AgentError> {
        let Some(agent) = self.registry.get(role) else {
            return Err(AgentError::NotRegistered(role));
        };

        debug!(agent = %role, endpoints = ctx.endpoints.len(), "dispatching agent");
        let output = agent.run(ctx).await?;
        if output.success {
            Ok(output)
        } else {
            Err(AgentError::Failed(
                output
                    .error
                    .unwrap_or_else(|| "agent reported failure without a reason".to_string()),
            ))
        }
    }

    /// Persist the terminal session and emit its report when applicable.
    fn finalize(&self, session: Session) -> QaResult<Session> {
        self.store.save_session(&session)?;

        if matches!(
            session.status,
            SessionStatus::Completed | SessionStatus::CompletedPartial
        ) {
            let markdown = report::render_session_report(&session);
            self.store.write_report(&session.session_id, &markdown)?;
        }

        info!(
            session_id = %session.session_id,
            status = %session.status,
            cost_usd = session.cost_usd,
            "session finalized"
        );
        Ok(session)
    }

    /// Build a context from a raw target string.
    ///
    /// A `/`-prefixed target that does not exist on disk is an endpoint;
    /// anything else is a file path.
    fn build_context(&self, target: &str, base_url: Option<String>) -> QaResult<QaContext> {
        if target.is_empty() {
            return Err(QaError::InvalidTarget("target must not be empty".to_string()));
        }

        let mut context = QaContext {
            base_url: Some(base_url.unwrap_or_else(|| self.config.base_url.clone())),
            ..QaContext::default()
        };

        if target.starts_with('/') && !Path::new(target).exists() {
            context.target_endpoints.push(EndpointTarget::get(target));
        } else {
            context.target_files.push(target.to_string());
        }
        Ok(context)
    }

    /// Append derived endpoints to the session context, skipping paths the
    /// caller already targeted.
    fn append_derived_endpoints(&self, context: &mut QaContext, derived: &[EndpointTarget]) {
        for ep in derived {
            if !context.target_endpoints.iter().any(|e| e.path == ep.path) {
                context.target_endpoints.push(ep.clone());
            }
        }
    }

    /// Whole minutes elapsed since this orchestrator was created.
    fn elapsed_minutes(&self) -> u64 {
        let elapsed = Utc::now() - self.created_at;
        u64::try_from(elapsed.num_minutes().max(0)).unwrap_or(0)
    }
}
