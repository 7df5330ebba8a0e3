//! Test context: what a session targets and how to reach it.

use serde::{Deserialize, Serialize};

/// One endpoint of the system under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointTarget {
    /// HTTP method.
    pub method: String,

    /// Request path, e.g. `/api/users`.
    pub path: String,

    /// Whether the endpoint requires authentication.
    #[serde(default)]
    pub auth_required: bool,

    /// Optional request/response schema, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<serde_json::Value>,
}

impl EndpointTarget {
    /// Create a GET endpoint target without auth or schema.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            path: path.into(),
            auth_required: false,
            schema: None,
        }
    }
}

/// Value object linking a session to the code and endpoints it exercises.
///
/// Never mutated after dispatch begins, except by the orchestrator
/// appending derived endpoints (e.g. a regression suite's `must_test` set).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaContext {
    /// Feature this session validates, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,

    /// Issue number this session validates, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<u64>,

    /// Bug this session attempts to reproduce, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bug_id: Option<String>,

    /// Source files under test.
    #[serde(default)]
    pub target_files: Vec<String>,

    /// Endpoints under test.
    #[serde(default)]
    pub target_endpoints: Vec<EndpointTarget>,

    /// Base URL of the system under test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Unified git diff of the change under test.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_diff: Option<String>,

    /// Free-form spec or issue text supplied by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec_text: Option<String>,

    /// Existing test files related to the targets.
    #[serde(default)]
    pub related_test_files: Vec<String>,
}

impl QaContext {
    /// Context scoped to a feature/issue pair.
    pub fn for_issue(feature_id: impl Into<String>, issue_number: u64) -> Self {
        Self {
            feature_id: Some(feature_id.into()),
            issue_number: Some(issue_number),
            ..Self::default()
        }
    }

    /// Line count of the git diff, if one is attached.
    pub fn diff_line_count(&self) -> usize {
        self.git_diff.as_ref().map_or(0, |d| d.lines().count())
    }
}
