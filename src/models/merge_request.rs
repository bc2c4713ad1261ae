//! Merge request model.
//!
//! Merge requests are immutable snapshots deserialized straight from the
//! GitLab API and discarded after use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// State of a merge request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestState {
    Opened,
    Closed,
    Merged,
    Locked,
}

impl From<&str> for MergeRequestState {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "merged" => Self::Merged,
            "closed" => Self::Closed,
            "locked" => Self::Locked,
            _ => Self::Opened,
        }
    }
}

impl std::fmt::Display for MergeRequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Opened => write!(f, "opened"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
            Self::Locked => write!(f, "locked"),
        }
    }
}

/// State filter for listing merge requests.
///
/// `All` only exists as a query filter, never as a merge request state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeRequestStateFilter {
    #[default]
    Opened,
    Closed,
    Merged,
    All,
}

impl MergeRequestStateFilter {
    /// The `state` query parameter to send, if any.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            Self::Opened => Some("opened"),
            Self::Closed => Some("closed"),
            Self::Merged => Some("merged"),
            Self::All => None,
        }
    }
}

/// Author of a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Assignee of a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub name: String,
    pub username: String,
}

/// Represents a GitLab merge request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    /// Project-scoped MR number.
    pub iid: i64,

    /// MR title.
    pub title: String,

    /// MR description (Markdown).
    #[serde(default)]
    pub description: Option<String>,

    /// Current state.
    pub state: MergeRequestState,

    pub author: Author,

    /// Branch being merged.
    pub source_branch: String,

    /// Destination branch.
    pub target_branch: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Merge timestamp (if merged).
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,

    /// URL to MR in GitLab web UI.
    pub web_url: String,

    #[serde(default)]
    pub labels: BTreeSet<String>,

    #[serde(default)]
    pub assignees: Vec<Assignee>,
}

impl MergeRequest {
    /// Check if the MR is open.
    pub fn is_open(&self) -> bool {
        self.state == MergeRequestState::Opened
    }

    /// Short reference as shown in GitLab, e.g. `!12`.
    pub fn reference(&self) -> String {
        format!("!{}", self.iid)
    }
}

/// A commit belonging to a merge request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequestCommit {
    pub id: String,
    pub short_id: String,
    pub title: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// A user who approved a merge request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approver {
    pub name: String,
    pub username: String,
}

/// Approval summary of a merge request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalSummary {
    pub approved: bool,
    pub approved_by: Vec<Approver>,
    pub approvals_required: u32,
    pub approvals_left: u32,
}

/// A merge request with the data loaded for its detail view.
///
/// `commits` and `approvals` are `None` when their lookup failed; the merge
/// request itself is still usable.
#[derive(Debug, Clone, Serialize)]
pub struct MergeRequestDetails {
    #[serde(flatten)]
    pub merge_request: MergeRequest,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<MergeRequestCommit>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub approvals: Option<ApprovalSummary>,
}
