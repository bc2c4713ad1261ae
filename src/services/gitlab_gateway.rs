//! Remote gateway: merge requests on GitLab plus the local Git sequences
//! that feed them.
//!
//! List and detail lookups never fail the caller on network errors; they
//! report through the [`Notifier`] and return an empty list / `None`.
//! Only a missing configuration is an error, raised before any request.

use crate::error::AppError;
use crate::models::{
    MergeRequest, MergeRequestDetails, MergeRequestForm, MergeRequestStateFilter, PluginSettings,
};
use crate::services::collaborators::Notifier;
use crate::services::git_repository::{GitRepository, RepositoryGateway};
use crate::services::gitlab_client::{
    AcceptMergeRequestBody, CreateMergeRequestBody, GitLabClient, GitLabClientConfig,
    MergeRequestsQuery,
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Operations against the code-hosting service.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// URL, token and project are present. No network access.
    fn is_configured(&self) -> bool;

    /// Merge requests in the given state; empty on API failure.
    async fn get_merge_requests(
        &self,
        filter: MergeRequestStateFilter,
    ) -> Result<Vec<MergeRequest>, AppError>;

    /// Merge requests matching `query` in any state; empty on API failure.
    async fn search_merge_requests(&self, query: &str) -> Result<Vec<MergeRequest>, AppError>;

    async fn get_merge_request(&self, iid: i64) -> Result<Option<MergeRequest>, AppError>;

    /// Merge request plus commits and approvals.
    ///
    /// `None` when the merge request itself cannot be loaded; a failed
    /// commit or approval lookup only leaves that field empty.
    async fn get_merge_request_details(
        &self,
        iid: i64,
    ) -> Result<Option<MergeRequestDetails>, AppError>;

    /// `None` on failure, which is also reported through the notifier.
    async fn create_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<MergeRequest>, AppError>;

    async fn merge_merge_request(
        &self,
        iid: i64,
        merge_commit_message: Option<&str>,
        squash: Option<bool>,
    ) -> Result<bool, AppError>;

    /// Fetch the source branch of `mr` without touching the working tree.
    async fn fetch_merge_request_branch(&self, mr: &MergeRequest, workdir: &Path) -> bool;

    /// Fetch the source branch of `mr` and check it out.
    async fn checkout_merge_request(&self, mr: &MergeRequest, workdir: &Path) -> bool;

    /// Create a branch, check it out and push it with upstream.
    async fn create_branch_and_checkout(&self, name: &str, workdir: &Path) -> bool;

    /// Stage everything, commit and push.
    async fn create_commit_and_push(&self, message: &str, workdir: &Path) -> bool;

    /// Move uncommitted changes onto a new branch and open a merge request.
    ///
    /// Runs branch-create, stage, commit, push-with-upstream and the remote
    /// create in order, stopping at the first failure. Earlier steps are
    /// not rolled back.
    async fn create_merge_request_from_uncommitted_changes(
        &self,
        form: &MergeRequestForm,
        commit_message: &str,
        workdir: &Path,
    ) -> Option<MergeRequest>;
}

/// [`RemoteGateway`] backed by the GitLab REST API and the `git` binary.
pub struct GitLabGateway {
    client: Option<GitLabClient>,
    project_id: String,
    notifier: Arc<dyn Notifier>,
}

impl GitLabGateway {
    /// Create a gateway. Without a URL or token no client is built.
    pub fn new(
        config: GitLabClientConfig,
        project_id: impl Into<String>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let client = if config.base_url.trim().is_empty() || config.token.trim().is_empty() {
            None
        } else {
            match GitLabClient::new(config) {
                Ok(client) => Some(client),
                Err(e) => {
                    log::error!("[gitlab] Failed to initialize GitLab client: {}", e);
                    notifier.notify("GitLab client initialization failed");
                    None
                }
            }
        };

        Self {
            client,
            project_id: project_id.into().trim().to_string(),
            notifier,
        }
    }

    /// Build a gateway from the current settings.
    ///
    /// Settings changes rebuild the gateway rather than mutating it.
    pub fn from_settings(settings: &PluginSettings, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(
            GitLabClientConfig {
                base_url: PluginSettings::normalize_url(&settings.gitlab_url),
                token: settings.personal_access_token.clone(),
                timeout_secs: settings.timeout_secs,
            },
            settings.project_id.clone(),
            notifier,
        )
    }

    /// The client, or a configuration error when unconfigured.
    fn api(&self) -> Result<&GitLabClient, AppError> {
        match &self.client {
            Some(client) if !self.project_id.is_empty() => Ok(client),
            Some(_) => Err(AppError::configuration("project ID is missing")),
            None => Err(AppError::configuration("GitLab URL or access token is missing")),
        }
    }

    async fn list(&self, query: MergeRequestsQuery) -> Result<Vec<MergeRequest>, AppError> {
        let api = self.api()?;

        match api.list_merge_requests(&self.project_id, &query).await {
            Ok(mrs) => Ok(mrs),
            Err(e) => {
                log::error!("[gitlab] Failed to fetch merge requests: {}", e);
                self.notifier.notify("Failed to load merge requests");
                Ok(Vec::new())
            }
        }
    }

    async fn run_uncommitted_sequence(
        &self,
        form: &MergeRequestForm,
        commit_message: &str,
        git: &GitRepository,
    ) -> Result<Option<MergeRequest>, AppError> {
        self.notifier
            .notify(&format!("Creating branch {}...", form.branch_name));
        git.create_branch(&form.branch_name).await?;

        self.notifier.notify("Creating commit...");
        git.stage_all().await?;
        git.commit_staged(commit_message).await?;

        self.notifier
            .notify(&format!("Pushing branch {} to remote...", form.branch_name));
        git.push_with_upstream(&form.branch_name).await?;

        self.notifier.notify("Creating merge request...");
        self.create_merge_request(
            &form.branch_name,
            &form.target_branch,
            &form.title,
            &form.description,
        )
        .await
    }
}

#[async_trait]
impl RemoteGateway for GitLabGateway {
    fn is_configured(&self) -> bool {
        self.api().is_ok()
    }

    async fn get_merge_requests(
        &self,
        filter: MergeRequestStateFilter,
    ) -> Result<Vec<MergeRequest>, AppError> {
        self.list(MergeRequestsQuery {
            state: filter.as_query().map(String::from),
            scope: Some("all".to_string()),
            with_labels_details: Some(false),
            ..Default::default()
        })
        .await
    }

    async fn search_merge_requests(&self, query: &str) -> Result<Vec<MergeRequest>, AppError> {
        self.list(MergeRequestsQuery {
            search: Some(query.to_string()),
            scope: Some("all".to_string()),
            with_labels_details: Some(false),
            ..Default::default()
        })
        .await
    }

    async fn get_merge_request(&self, iid: i64) -> Result<Option<MergeRequest>, AppError> {
        let api = self.api()?;

        match api.get_merge_request(&self.project_id, iid).await {
            Ok(mr) => Ok(Some(mr)),
            Err(e) => {
                log::error!("[gitlab] Failed to fetch merge request !{}: {}", iid, e);
                self.notifier.notify("Failed to load merge request");
                Ok(None)
            }
        }
    }

    async fn get_merge_request_details(
        &self,
        iid: i64,
    ) -> Result<Option<MergeRequestDetails>, AppError> {
        let api = self.api()?;

        let (mr, commits, approvals) = futures::join!(
            api.get_merge_request(&self.project_id, iid),
            api.list_merge_request_commits(&self.project_id, iid),
            api.get_mr_approvals(&self.project_id, iid),
        );

        let merge_request = match mr {
            Ok(mr) => mr,
            Err(e) => {
                log::error!("[gitlab] Failed to fetch merge request details !{}: {}", iid, e);
                self.notifier.notify("Failed to load merge request details");
                return Ok(None);
            }
        };

        let commits = commits
            .map_err(|e| log::warn!("Failed to fetch commits for MR {}: {}", iid, e))
            .ok();
        let approvals = approvals
            .map_err(|e| log::warn!("Failed to fetch approvals for MR {}: {}", iid, e))
            .ok()
            .map(Into::into);

        Ok(Some(MergeRequestDetails {
            merge_request,
            commits,
            approvals,
        }))
    }

    async fn create_merge_request(
        &self,
        source_branch: &str,
        target_branch: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<MergeRequest>, AppError> {
        let api = self.api()?;

        let body = CreateMergeRequestBody {
            source_branch,
            target_branch,
            title,
            description: Some(description).filter(|d| !d.trim().is_empty()),
        };

        match api.create_merge_request(&self.project_id, &body).await {
            Ok(mr) => {
                self.notifier
                    .notify(&format!("Merge request {} created", mr.reference()));
                Ok(Some(mr))
            }
            Err(e) => {
                log::error!("[gitlab] Failed to create merge request: {}", e);
                self.notifier
                    .notify(&format!("Failed to create merge request: {}", e));
                Ok(None)
            }
        }
    }

    async fn merge_merge_request(
        &self,
        iid: i64,
        merge_commit_message: Option<&str>,
        squash: Option<bool>,
    ) -> Result<bool, AppError> {
        let api = self.api()?;

        let body = AcceptMergeRequestBody {
            merge_commit_message: merge_commit_message.filter(|m| !m.trim().is_empty()),
            squash,
        };

        match api.merge_merge_request(&self.project_id, iid, &body).await {
            Ok(()) => {
                self.notifier
                    .notify(&format!("Merge request !{} merged", iid));
                Ok(true)
            }
            Err(e) => {
                log::error!("[gitlab] Failed to merge !{}: {}", iid, e);
                self.notifier
                    .notify(&format!("Failed to merge merge request: {}", e));
                Ok(false)
            }
        }
    }

    async fn fetch_merge_request_branch(&self, mr: &MergeRequest, workdir: &Path) -> bool {
        let git = GitRepository::new(workdir);
        let branch = mr.source_branch.as_str();

        self.notifier.notify(&format!("Fetching branch {}...", branch));

        // Some remotes reject the local:remote mapping for branches that do
        // not exist locally yet.
        if let Err(e) = git.fetch(&format!("{0}:{0}", branch)).await {
            log::warn!("[gitlab] Fetching {0}:{0} failed, retrying by name: {1}", branch, e);
            if let Err(e) = git.fetch(branch).await {
                log::error!("[gitlab] Failed to fetch branch {}: {}", branch, e);
                self.notifier
                    .notify(&format!("Failed to fetch branch: {}", e));
                return false;
            }
        }
        true
    }

    async fn checkout_merge_request(&self, mr: &MergeRequest, workdir: &Path) -> bool {
        if !self.fetch_merge_request_branch(mr, workdir).await {
            return false;
        }

        let git = GitRepository::new(workdir);
        let branch = mr.source_branch.as_str();
        self.notifier.notify(&format!("Checking out branch {}...", branch));
        match git.switch_branch(branch).await {
            Ok(()) => {
                self.notifier
                    .notify(&format!("Branch {} checked out", branch));
                true
            }
            Err(e) => {
                log::error!("[gitlab] Failed to check out {}: {}", branch, e);
                self.notifier
                    .notify(&format!("Failed to check out branch: {}", e));
                false
            }
        }
    }

    async fn create_branch_and_checkout(&self, name: &str, workdir: &Path) -> bool {
        let git = GitRepository::new(workdir);

        self.notifier.notify(&format!("Creating branch {}...", name));
        let result = async {
            git.create_branch(name).await?;
            self.notifier
                .notify(&format!("Pushing branch {} to remote...", name));
            git.push_with_upstream(name).await
        }
        .await;

        match result {
            Ok(()) => {
                self.notifier
                    .notify(&format!("Branch {} created, checked out and pushed", name));
                true
            }
            Err(e) => {
                log::error!("[gitlab] Failed to create branch {}: {}", name, e);
                self.notifier
                    .notify(&format!("Failed to create branch: {}", e));
                false
            }
        }
    }

    async fn create_commit_and_push(&self, message: &str, workdir: &Path) -> bool {
        let git = GitRepository::new(workdir);

        self.notifier.notify("Creating commit...");
        let result = async {
            git.stage_all().await?;
            git.commit_staged(message).await?;
            self.notifier.notify("Pushing commit to remote...");
            git.push().await
        }
        .await;

        match result {
            Ok(()) => {
                self.notifier.notify("Commit created and pushed");
                true
            }
            Err(e) => {
                log::error!("[gitlab] Failed to commit and push: {}", e);
                self.notifier
                    .notify(&format!("Failed to create commit: {}", e));
                false
            }
        }
    }

    async fn create_merge_request_from_uncommitted_changes(
        &self,
        form: &MergeRequestForm,
        commit_message: &str,
        workdir: &Path,
    ) -> Option<MergeRequest> {
        if let Err(e) = self.api() {
            self.notifier
                .notify(&format!("Failed to create merge request: {}", e));
            return None;
        }

        let git = GitRepository::new(workdir);
        match self.run_uncommitted_sequence(form, commit_message, &git).await {
            Ok(mr) => mr,
            Err(e) => {
                log::error!(
                    "[gitlab] Failed to create merge request from uncommitted changes: {}",
                    e
                );
                self.notifier
                    .notify(&format!("Failed to create merge request: {}", e));
                None
            }
        }
    }
}
