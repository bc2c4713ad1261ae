//! Branch switching with uncommitted-changes reconciliation.
//!
//! A switch never loses local changes without an explicit, distinguishable
//! decision: discarding and moving changes into a merge request are separate
//! choices, and every non-cancelled path ends with the actual checkout of the
//! target branch.

use crate::error::AppError;
use crate::models::{MergeRequestForm, UncommittedChangesDecision};
use crate::services::collaborators::{MergeRequestListView, Notifier, Prompter, StatusDisplay};
use crate::services::git_repository::RepositoryGateway;
use crate::services::gitlab_gateway::RemoteGateway;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Notification sent when a switch is abandoned because input was missing.
pub const SWITCH_ABORTED: &str = "Branch switch aborted";

/// How a branch switch ended.
#[derive(Debug)]
pub enum SwitchOutcome {
    /// The target branch is checked out.
    Switched,
    /// The user cancelled or left required input empty; nothing was changed.
    Cancelled,
    /// A gateway call failed. The working tree may be on the original branch
    /// or on an intermediate one, depending on the failing step.
    Failed(AppError),
}

impl SwitchOutcome {
    /// The working directory's checked-out branch is the target branch.
    pub fn is_switched(&self) -> bool {
        matches!(self, Self::Switched)
    }
}

/// User-facing surfaces the coordinator drives.
#[derive(Clone)]
pub struct Collaborators {
    pub prompter: Arc<dyn Prompter>,
    pub notifier: Arc<dyn Notifier>,
    pub status: Arc<dyn StatusDisplay>,
}

/// Moves the working directory to a target branch without losing work.
pub struct BranchSwitchCoordinator {
    repository: Arc<dyn RepositoryGateway>,
    remote: Arc<dyn RemoteGateway>,
    collaborators: Collaborators,
    list_view: Option<Arc<dyn MergeRequestListView>>,
    workdir: PathBuf,
    ignore_entries: Vec<String>,
    /// Serializes switches against the shared working directory.
    switch_lock: Mutex<()>,
}

impl BranchSwitchCoordinator {
    pub fn new(
        repository: Arc<dyn RepositoryGateway>,
        remote: Arc<dyn RemoteGateway>,
        collaborators: Collaborators,
        workdir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repository,
            remote,
            collaborators,
            list_view: None,
            workdir: workdir.into(),
            ignore_entries: Vec::new(),
            switch_lock: Mutex::new(()),
        }
    }

    /// Reload this view after a merge request was created during a switch.
    pub fn with_list_view(mut self, list_view: Arc<dyn MergeRequestListView>) -> Self {
        self.list_view = Some(list_view);
        self
    }

    /// Ignore-file entries ensured before every switch.
    pub fn with_ignore_entries(mut self, entries: Vec<String>) -> Self {
        self.ignore_entries = entries;
        self
    }

    /// Swap the remote gateway after a settings change.
    pub fn set_remote(&mut self, remote: Arc<dyn RemoteGateway>) {
        self.remote = remote;
    }

    /// Switch to `target`, asking the user what to do with uncommitted changes.
    ///
    /// Concurrent calls on the same coordinator run one after another.
    pub async fn switch_to(&self, target: &str) -> SwitchOutcome {
        let _guard = self.switch_lock.lock().await;
        log::info!("[switch] Switching to '{}'", target);

        match self.run(target).await {
            Ok(true) => SwitchOutcome::Switched,
            Ok(false) => {
                log::info!("[switch] Switch to '{}' cancelled", target);
                SwitchOutcome::Cancelled
            }
            Err(e) => {
                log::error!("[switch] Switch to '{}' failed: {}", target, e);
                self.collaborators
                    .notifier
                    .notify(&format!("Failed to switch to branch '{}': {}", target, e));
                SwitchOutcome::Failed(e)
            }
        }
    }

    async fn run(&self, target: &str) -> Result<bool, AppError> {
        // Checked before the ignore file is touched, so the coordinator's own
        // edit never counts as the user's changes.
        if !self.has_user_changes().await {
            self.maintain_ignore_file().await;
            return self.finish(target).await;
        }

        let decision = self.collaborators.prompter.prompt_choice().await;
        log::debug!("[switch] Uncommitted changes decision: {}", decision);

        match decision {
            UncommittedChangesDecision::Cancel => Ok(false),
            UncommittedChangesDecision::Discard => {
                self.repository.discard_changes().await?;
                self.maintain_ignore_file().await;
                self.finish(target).await
            }
            UncommittedChangesDecision::CommitAndPush => {
                let message = self
                    .collaborators
                    .prompter
                    .prompt_text("Commit message")
                    .await
                    .filter(|m| !m.trim().is_empty());

                let Some(message) = message else {
                    self.collaborators.notifier.notify(SWITCH_ABORTED);
                    return Ok(false);
                };

                self.maintain_ignore_file().await;
                self.repository.commit_and_push(message.trim()).await?;
                self.finish(target).await
            }
            UncommittedChangesDecision::CreateMergeRequest => {
                let Some(form) = self.collect_merge_request_form().await else {
                    return Ok(false);
                };

                self.maintain_ignore_file().await;

                // Best effort: the switch goes ahead even if creation failed.
                let created = self
                    .remote
                    .create_merge_request_from_uncommitted_changes(
                        &form,
                        form.title.trim(),
                        &self.workdir,
                    )
                    .await;
                if created.is_none() {
                    log::warn!(
                        "[switch] Merge request for '{}' was not created, switching anyway",
                        form.branch_name
                    );
                }

                let switched = self.finish(target).await?;
                if let Some(view) = self.list_view.as_ref().filter(|v| v.is_open()) {
                    view.reload().await;
                }
                Ok(switched)
            }
        }
    }

    /// Uncommitted changes other than entries appended by an earlier switch.
    async fn has_user_changes(&self) -> bool {
        if !self.repository.has_uncommitted_changes().await {
            return false;
        }
        self.ignore_entries.is_empty()
            || !self
                .repository
                .only_gitignore_entries_pending(&self.ignore_entries)
                .await
    }

    /// Append missing ignore entries once the switch is going ahead.
    ///
    /// Runs after any discard and before any commit, so the entries survive
    /// the former and are included in the latter. Failures are only logged.
    async fn maintain_ignore_file(&self) {
        if self.ignore_entries.is_empty() {
            return;
        }
        if let Err(e) = self.repository.ensure_gitignore(&self.ignore_entries).await {
            log::warn!("[switch] Could not update .gitignore: {}", e);
        }
    }

    /// Ask for the merge request form; `None` (after notifying) when the
    /// remote is unconfigured or the form is dismissed or incomplete.
    async fn collect_merge_request_form(&self) -> Option<MergeRequestForm> {
        if !self.remote.is_configured() {
            self.collaborators.notifier.notify(&format!(
                "GitLab is not configured. {}",
                SWITCH_ABORTED
            ));
            return None;
        }

        let form = self
            .collaborators
            .prompter
            .prompt_merge_request_form()
            .await
            .filter(MergeRequestForm::is_complete);

        if form.is_none() {
            self.collaborators.notifier.notify(SWITCH_ABORTED);
        }
        form
    }

    /// Check out the target and refresh the status display.
    async fn finish(&self, target: &str) -> Result<bool, AppError> {
        self.repository.switch_branch(target).await?;
        self.collaborators.status.refresh().await;
        Ok(true)
    }
}
