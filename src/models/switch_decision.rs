//! User decisions taken while switching branches.

use serde::{Deserialize, Serialize};

/// Default branch a new merge request targets.
pub const DEFAULT_TARGET_BRANCH: &str = "main";

/// What to do with uncommitted changes before switching branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UncommittedChangesDecision {
    /// Move the changes to a new branch and open a merge request for them.
    CreateMergeRequest,
    /// Commit the changes on the current branch and push.
    CommitAndPush,
    /// Throw the changes away.
    Discard,
    Cancel,
}

impl std::fmt::Display for UncommittedChangesDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateMergeRequest => write!(f, "create merge request"),
            Self::CommitAndPush => write!(f, "commit and push"),
            Self::Discard => write!(f, "discard"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

/// Input collected for a merge request created from uncommitted changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestForm {
    pub title: String,
    pub description: String,
    pub branch_name: String,
    pub target_branch: String,
}

impl MergeRequestForm {
    /// Build a form, deriving the branch name from the title when none is given.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        branch_name: Option<String>,
        target_branch: Option<String>,
    ) -> Self {
        let title = title.into();
        let branch_name = branch_name
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| slugify(&title));
        let target_branch = target_branch
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TARGET_BRANCH.to_string());

        Self {
            title,
            description: description.into(),
            branch_name,
            target_branch,
        }
    }

    /// Title, branch name and target branch are all present.
    ///
    /// The description is optional.
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.branch_name.trim().is_empty()
            && !self.target_branch.trim().is_empty()
    }
}

/// Turn a merge request title into a branch name.
///
/// Lowercases, drops everything but ASCII word characters, whitespace and
/// `-`, collapses separator runs into a single `-` and trims dashes.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_separator = true;
        } else if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        }
    }

    slug
}
