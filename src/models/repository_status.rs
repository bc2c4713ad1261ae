//! Working tree status model.

use serde::Serialize;

/// Snapshot of the working tree, derived fresh on every query.
///
/// `is_clean` is reported by git itself and is authoritative; the counts are
/// a display aid and may disagree with it (e.g. unmerged entries are counted
/// nowhere but still make the tree dirty).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryStatus {
    /// Checked-out branch name.
    pub current_branch: String,

    /// Upstream ref (e.g. `origin/main`), if the branch tracks one.
    pub tracking: Option<String>,

    pub modified: u32,

    /// Staged additions plus untracked files.
    pub created: u32,

    pub deleted: u32,

    /// Commits ahead of the upstream.
    pub ahead: u32,

    /// Commits behind the upstream.
    pub behind: u32,

    pub is_clean: bool,
}

impl RepositoryStatus {
    /// Total number of counted changes.
    pub fn change_count(&self) -> u32 {
        self.modified + self.created + self.deleted
    }
}
