//! QA session domain model.
//!
//! A session is owned exclusively by the orchestrator that created it, moves
//! through `Pending -> Running -> {Completed, CompletedPartial, Failed,
//! Blocked}`, and is persisted as an immutable snapshot on every status
//! transition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::context::QaContext;
use super::result::SessionResult;

/// Event that initiated a QA session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trigger {
    /// A feature/issue was just verified fixed.
    PostVerification,
    /// A reported bug is being reproduced.
    BugReproduction,
    /// Ad-hoc invocation by a user.
    UserCommand,
    /// Validation gate before a merge.
    PreMerge,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PostVerification => "post-verification",
            Self::BugReproduction => "bug-reproduction",
            Self::UserCommand => "user-command",
            Self::PreMerge => "pre-merge",
        };
        write!(f, "{s}")
    }
}

/// Test-intensity level controlling which agents run and how many
/// endpoints are probed.
///
/// `Semantic` is reachable only through an explicit override; the depth
/// selector never produces it and the escalation/downgrade ladders leave
/// it untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    /// Behavioral probe only.
    Shallow,
    /// Behavioral + contract.
    Standard,
    /// All four agent roles.
    Deep,
    /// Regression scan first, then behavioral over its suite.
    Regression,
    /// Semantic agent only.
    Semantic,
}

impl Depth {
    /// One step up the escalation ladder.
    ///
    /// `shallow -> standard -> deep`; `deep` is sticky. `regression` is not
    /// on the same ladder and escalates to `standard`. `semantic` does not
    /// move.
    pub fn escalated(self) -> Self {
        match self {
            Self::Shallow => Self::Standard,
            Self::Standard | Self::Deep => Self::Deep,
            Self::Regression => Self::Standard,
            Self::Semantic => Self::Semantic,
        }
    }

    /// One step down the downgrade ladder.
    ///
    /// `deep -> standard -> shallow`; `shallow` is the floor. `regression`
    /// downgrades to `standard`. `semantic` does not move.
    pub fn downgraded(self) -> Self {
        match self {
            Self::Deep => Self::Standard,
            Self::Standard | Self::Shallow => Self::Shallow,
            Self::Regression => Self::Standard,
            Self::Semantic => Self::Semantic,
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Shallow => "shallow",
            Self::Standard => "standard",
            Self::Deep => "deep",
            Self::Regression => "regression",
            Self::Semantic => "semantic",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shallow" => Ok(Self::Shallow),
            "standard" => Ok(Self::Standard),
            "deep" => Ok(Self::Deep),
            "regression" => Ok(Self::Regression),
            "semantic" => Ok(Self::Semantic),
            other => Err(format!(
                "unknown depth: {other} (expected shallow|standard|deep|regression|semantic)"
            )),
        }
    }
}

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created, agents not yet dispatched.
    Pending,
    /// Dispatch in progress.
    Running,
    /// All applicable agents ran to completion.
    Completed,
    /// Stopped early by a budget or timeout guard.
    CompletedPartial,
    /// Session machinery failed during issue validation.
    Failed,
    /// Session machinery failed during an ad-hoc test.
    Blocked,
}

impl SessionStatus {
    /// Terminal states are final; no retries are performed.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CompletedPartial | Self::Failed | Self::Blocked
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::CompletedPartial => "completed_partial",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
        };
        write!(f, "{s}")
    }
}

/// One QA session: identity, targeting context, lifecycle, and outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier, `qa-YYYYMMDD-HHMMSS-xxxxxx`.
    pub session_id: String,

    /// What initiated this session.
    pub trigger: Trigger,

    /// Selected test intensity.
    pub depth: Depth,

    /// Lifecycle status.
    pub status: SessionStatus,

    /// Targeting context; immutable after dispatch begins except for
    /// orchestrator-appended derived endpoints.
    pub context: QaContext,

    /// Aggregated outcome; `None` until a terminal status is reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<SessionResult>,

    /// Cost attributed to this session in USD.
    #[serde(default)]
    pub cost_usd: f64,

    /// When the session was created.
    pub created_at: DateTime<Utc>,

    /// When dispatch began.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When a terminal status was reached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Error message for `Failed`/`Blocked` sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Session {
    /// Create a pending session with a freshly generated id.
    pub fn new(trigger: Trigger, depth: Depth, context: QaContext) -> Self {
        Self {
            session_id: Self::generate_id(Utc::now()),
            trigger,
            depth,
            status: SessionStatus::Pending,
            context,
            result: None,
            cost_usd: 0.0,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    /// Generate a session id from a timestamp plus a random hex suffix.
    ///
    /// The suffix keeps ids collision-resistant across concurrent processes
    /// sharing the same second while the ids stay sortable by time.
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let suffix = &Uuid::new_v4().simple().to_string()[..6];
        format!("qa-{}-{suffix}", now.format("%Y%m%d-%H%M%S"))
    }

    /// Mark dispatch as started.
    pub fn mark_running(&mut self) {
        self.status = SessionStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Finalize with a full result.
    pub fn complete(&mut self, result: SessionResult) {
        self.result = Some(result);
        self.status = SessionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Finalize early with whatever was gathered plus an explicit reason.
    pub fn complete_partial(&mut self, result: SessionResult) {
        self.result = Some(result);
        self.status = SessionStatus::CompletedPartial;
        self.completed_at = Some(Utc::now());
    }

    /// Finalize as failed (issue-validation flows).
    pub fn fail(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.status = SessionStatus::Failed;
        self.completed_at = Some(Utc::now());
    }

    /// Finalize as blocked (ad-hoc test flows).
    pub fn block(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.status = SessionStatus::Blocked;
        self.completed_at = Some(Utc::now());
    }

    /// Last six characters of the session id, used for bug-id prefixes.
    pub fn id_suffix(&self) -> &str {
        let id = self.session_id.as_str();
        &id[id.len().saturating_sub(6)..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let now = Utc::now();
        let id = Session::generate_id(now);
        assert!(id.starts_with("qa-"));
        // qa-YYYYMMDD-HHMMSS-xxxxxx
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 6);
    }

    #[test]
    fn test_ids_are_unique_within_one_second() {
        let now = Utc::now();
        let a = Session::generate_id(now);
        let b = Session::generate_id(now);
        assert_ne!(a, b);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut session = Session::new(Trigger::UserCommand, Depth::Shallow, QaContext::default());
        assert_eq!(session.status, SessionStatus::Pending);
        assert!(session.result.is_none());
        assert!(!session.status.is_terminal());

        session.mark_running();
        assert_eq!(session.status, SessionStatus::Running);
        assert!(session.started_at.is_some());

        session.complete(SessionResult::empty());
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.status.is_terminal());
        assert!(session.result.is_some());
        assert!(session.completed_at.is_some());
    }

    #[test]
    fn test_result_absent_until_terminal() {
        let mut session = Session::new(Trigger::PreMerge, Depth::Deep, QaContext::default());
        session.mark_running();
        assert!(session.result.is_none());

        session.complete_partial(SessionResult::partial("cost_limit: exceeded"));
        assert_eq!(session.status, SessionStatus::CompletedPartial);
        assert!(session.result.is_some());
    }

    #[test]
    fn test_escalation_ladder() {
        assert_eq!(Depth::Shallow.escalated(), Depth::Standard);
        assert_eq!(Depth::Standard.escalated(), Depth::Deep);
        assert_eq!(Depth::Deep.escalated(), Depth::Deep);
        assert_eq!(Depth::Regression.escalated(), Depth::Standard);
        assert_eq!(Depth::Semantic.escalated(), Depth::Semantic);
    }

    #[test]
    fn test_downgrade_ladder() {
        assert_eq!(Depth::Deep.downgraded(), Depth::Standard);
        assert_eq!(Depth::Standard.downgraded(), Depth::Shallow);
        assert_eq!(Depth::Shallow.downgraded(), Depth::Shallow);
        assert_eq!(Depth::Regression.downgraded(), Depth::Standard);
    }

    #[test]
    fn test_id_suffix() {
        let mut session = Session::new(Trigger::UserCommand, Depth::Shallow, QaContext::default());
        session.session_id = "qa-20260101-120000-abc123".to_string();
        assert_eq!(session.id_suffix(), "abc123");
    }

    #[test]
    fn test_session_serde_round_trip() {
        use crate::domain::models::context::EndpointTarget;
        use crate::domain::models::finding::{Finding, Severity};
        use serde_json::json;

        let mut context = QaContext::for_issue("feat-x", 7);
        context.target_endpoints.push(EndpointTarget {
            method: "POST".to_string(),
            path: "/api/orders".to_string(),
            auth_required: true,
            schema: Some(json!({"type": "object"})),
        });
        context.base_url = Some("http://localhost:3000".to_string());

        let mut session = Session::new(Trigger::PostVerification, Depth::Standard, context);
        session.mark_running();

        let mut finding = Finding::new(
            Severity::Critical,
            "behavioral",
            "/api/orders",
            "behavioral",
            "500 on create",
        );
        finding.evidence = Some(json!({"response": {"status": 500, "body": "boom"}}));
        finding.expected = Some(json!({"status": 201}));
        finding.actual = Some(json!({"status": 500}));

        let mut result = SessionResult::empty();
        result.findings = vec![finding];
        result.critical_count = 1;
        result.recommendation = crate::domain::models::finding::Recommendation::Block;
        session.complete(result);

        let serialized = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&serialized).unwrap();

        assert_eq!(restored, session);
        assert!(restored.context.target_endpoints[0].auth_required);
        assert_eq!(
            restored.result.unwrap().findings[0]
                .evidence
                .as_ref()
                .unwrap()["response"]["status"],
            json!(500)
        );
    }
}
