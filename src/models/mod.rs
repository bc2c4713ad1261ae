//! Data models for the application.
//!
//! These models represent repository state, GitLab merge requests and the
//! user's settings. All of them derive Serialize for `--json` output.

pub mod gitignore;
pub mod merge_request;
pub mod repository_status;
pub mod settings;
pub mod switch_decision;

// Re-exports for convenient access
pub use gitignore::GitignoreStatus;
pub use merge_request::{
    ApprovalSummary, Approver, Assignee, Author, MergeRequest, MergeRequestCommit,
    MergeRequestDetails, MergeRequestState, MergeRequestStateFilter,
};
pub use repository_status::RepositoryStatus;
pub use settings::PluginSettings;
pub use switch_decision::{MergeRequestForm, UncommittedChangesDecision, DEFAULT_TARGET_BRANCH};
