//! Local Git repository gateway.
//!
//! Wraps the `git` command line for the vault's working directory. Read-only
//! queries that feed display surfaces degrade to safe defaults (and log the
//! underlying error); mutating operations propagate failures.

use crate::error::AppError;
use crate::models::{GitignoreStatus, RepositoryStatus};
use crate::services::gitignore::{self, GITIGNORE_FILE};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Remote that branches are pushed to and fetched from.
pub const DEFAULT_REMOTE: &str = "origin";

/// Branch name reported when the current branch cannot be resolved.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Reject names git would parse as options.
fn check_branch_name(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.starts_with('-') {
        return Err(AppError::invalid_input_field(
            format!("Invalid branch name '{}'", name),
            "branch",
        ));
    }
    Ok(())
}

/// Operations on the local repository.
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    /// Whether the working directory is inside a repository. Never fails.
    async fn is_repository(&self) -> bool;

    /// Fresh working tree status.
    async fn get_status(&self) -> Result<RepositoryStatus, AppError>;

    /// Local branch names; empty on failure.
    async fn get_branches(&self) -> Vec<String>;

    /// Current branch name; [`UNKNOWN_BRANCH`] on failure.
    async fn get_current_branch(&self) -> String;

    /// `!status.is_clean`; `false` on failure.
    async fn has_uncommitted_changes(&self) -> bool;

    /// Stage everything and commit.
    async fn commit(&self, message: &str) -> Result<(), AppError>;

    async fn push(&self) -> Result<(), AppError>;

    async fn pull(&self) -> Result<(), AppError>;

    /// Create a branch and check it out.
    async fn create_branch(&self, name: &str) -> Result<(), AppError>;

    async fn switch_branch(&self, name: &str) -> Result<(), AppError>;

    async fn delete_branch(&self, name: &str) -> Result<(), AppError>;

    /// Drop all tracked modifications and untracked files.
    async fn discard_changes(&self) -> Result<(), AppError>;

    /// Commit then push. A failed push leaves the commit in place.
    async fn commit_and_push(&self, message: &str) -> Result<(), AppError>;

    /// Append missing entries to `.gitignore`, creating it if needed.
    async fn ensure_gitignore(&self, entries: &[String]) -> Result<(), AppError>;

    async fn check_gitignore(&self, entries: &[String]) -> Result<GitignoreStatus, AppError>;

    /// Whether the only uncommitted change is `.gitignore` holding exactly
    /// the committed content plus the entries [`ensure_gitignore`] appends.
    ///
    /// [`ensure_gitignore`]: RepositoryGateway::ensure_gitignore
    async fn only_gitignore_entries_pending(&self, _entries: &[String]) -> bool {
        false
    }

    /// Initialize a new repository in the working directory.
    async fn init(&self) -> Result<(), AppError>;
}

/// [`RepositoryGateway`] backed by the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepository {
    workdir: PathBuf,
}

impl GitRepository {
    /// Create a gateway for the given working directory.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// The working directory this gateway operates on.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run a git command and return its stdout.
    async fn git(&self, args: &[&str]) -> Result<String, AppError> {
        let operation = args.first().copied().unwrap_or("git");
        log::debug!("[git] {} (in {})", args.join(" "), self.workdir.display());

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| {
                AppError::repository_with_op(format!("Failed to execute git: {}", e), operation)
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            // git commit reports "nothing to commit" on stdout
            let message = if stderr.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            Err(AppError::repository_with_op(
                if message.is_empty() {
                    format!("git {} exited with {}", operation, output.status)
                } else {
                    message
                },
                args.join(" "),
            ))
        }
    }

    /// Current branch via `rev-parse`, independent of the status payload.
    pub async fn current_branch(&self) -> Result<String, AppError> {
        let branch = self.git(&["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        Ok(branch.trim().to_string())
    }

    /// Local branch names.
    pub async fn branches(&self) -> Result<Vec<String>, AppError> {
        let output = self
            .git(&["branch", "--list", "--format=%(refname:short)"])
            .await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    /// Stage every working tree change, including deletions.
    pub async fn stage_all(&self) -> Result<(), AppError> {
        self.git(&["add", "-A"]).await.map(|_| ())
    }

    /// Commit whatever is staged.
    pub async fn commit_staged(&self, message: &str) -> Result<(), AppError> {
        self.git(&["commit", "-m", message]).await.map(|_| ())
    }

    /// Push a branch to [`DEFAULT_REMOTE`] and set it as upstream.
    pub async fn push_with_upstream(&self, branch: &str) -> Result<(), AppError> {
        check_branch_name(branch)?;
        self.git(&["push", "--set-upstream", DEFAULT_REMOTE, branch])
            .await
            .map(|_| ())
    }

    /// Fetch a refspec from [`DEFAULT_REMOTE`].
    pub async fn fetch(&self, refspec: &str) -> Result<(), AppError> {
        check_branch_name(refspec)?;
        self.git(&["fetch", DEFAULT_REMOTE, refspec]).await.map(|_| ())
    }

    fn gitignore_path(&self) -> PathBuf {
        self.workdir.join(GITIGNORE_FILE)
    }

    /// Current `.gitignore` content, `None` when the file does not exist.
    async fn read_gitignore(&self) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(self.gitignore_path()).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::repository_with_op(
                format!("Failed to read .gitignore: {}", e),
                "gitignore",
            )),
        }
    }
}

#[async_trait]
impl RepositoryGateway for GitRepository {
    async fn is_repository(&self) -> bool {
        match self.git(&["status", "--porcelain"]).await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("[git] {} is not a repository: {}", self.workdir.display(), e);
                false
            }
        }
    }

    async fn get_status(&self) -> Result<RepositoryStatus, AppError> {
        let output = self
            .git(&["status", "--porcelain=v2", "--branch"])
            .await?;
        let mut status = parse_porcelain_v2(&output);

        // rev-parse fails on an unborn branch; keep the status header then
        match self.current_branch().await {
            Ok(branch) => status.current_branch = branch,
            Err(e) => log::debug!("[git] rev-parse HEAD failed: {}", e),
        }
        if status.current_branch.is_empty() {
            status.current_branch = UNKNOWN_BRANCH.to_string();
        }

        Ok(status)
    }

    async fn get_branches(&self) -> Vec<String> {
        self.branches().await.unwrap_or_else(|e| {
            log::warn!("[git] Failed to get branches: {}", e);
            Vec::new()
        })
    }

    async fn get_current_branch(&self) -> String {
        self.current_branch().await.unwrap_or_else(|e| {
            log::warn!("[git] Failed to get current branch: {}", e);
            UNKNOWN_BRANCH.to_string()
        })
    }

    async fn has_uncommitted_changes(&self) -> bool {
        match self.get_status().await {
            Ok(status) => !status.is_clean,
            Err(e) => {
                log::warn!("[git] Failed to check for uncommitted changes: {}", e);
                false
            }
        }
    }

    async fn commit(&self, message: &str) -> Result<(), AppError> {
        self.stage_all().await?;
        self.commit_staged(message).await?;
        log::info!("[git] Committed changes");
        Ok(())
    }

    async fn push(&self) -> Result<(), AppError> {
        self.git(&["push"]).await?;
        log::info!("[git] Pushed changes");
        Ok(())
    }

    async fn pull(&self) -> Result<(), AppError> {
        self.git(&["pull"]).await?;
        log::info!("[git] Pulled changes");
        Ok(())
    }

    async fn create_branch(&self, name: &str) -> Result<(), AppError> {
        check_branch_name(name)?;
        self.git(&["checkout", "-b", name]).await?;
        log::info!("[git] Created branch '{}'", name);
        Ok(())
    }

    async fn switch_branch(&self, name: &str) -> Result<(), AppError> {
        check_branch_name(name)?;
        self.git(&["checkout", name]).await?;
        log::info!("[git] Switched to branch '{}'", name);
        Ok(())
    }

    async fn delete_branch(&self, name: &str) -> Result<(), AppError> {
        check_branch_name(name)?;
        self.git(&["branch", "-d", name]).await?;
        log::info!("[git] Deleted branch '{}'", name);
        Ok(())
    }

    async fn discard_changes(&self) -> Result<(), AppError> {
        self.git(&["reset", "--hard", "HEAD"]).await?;
        self.git(&["clean", "-fd"]).await?;
        log::info!("[git] Discarded uncommitted changes");
        Ok(())
    }

    async fn commit_and_push(&self, message: &str) -> Result<(), AppError> {
        self.commit(message).await?;
        self.push().await
    }

    async fn ensure_gitignore(&self, entries: &[String]) -> Result<(), AppError> {
        let content = self.read_gitignore().await?.unwrap_or_default();

        if let Some(updated) = gitignore::ensure_entries(&content, entries) {
            tokio::fs::write(self.gitignore_path(), updated)
                .await
                .map_err(|e| {
                    AppError::repository_with_op(
                        format!("Failed to write .gitignore: {}", e),
                        "gitignore",
                    )
                })?;
            log::info!("[git] Updated .gitignore");
        }

        Ok(())
    }

    async fn check_gitignore(&self, entries: &[String]) -> Result<GitignoreStatus, AppError> {
        let content = self.read_gitignore().await?;
        let exists = content.is_some();
        let content = content.unwrap_or_default();

        Ok(GitignoreStatus {
            exists,
            entries: entries
                .iter()
                .map(|entry| (entry.clone(), gitignore::has_entry(&content, entry)))
                .collect(),
        })
    }

    async fn only_gitignore_entries_pending(&self, entries: &[String]) -> bool {
        let changed = match self.git(&["status", "--porcelain", "--untracked-files=all"]).await {
            Ok(output) => output,
            Err(e) => {
                log::warn!("[git] Failed to list changed paths: {}", e);
                return false;
            }
        };
        let mut paths = changed.lines().filter_map(|line| line.get(3..));
        if paths.next() != Some(GITIGNORE_FILE) || paths.next().is_some() {
            return false;
        }

        // Not in HEAD means the file was created from scratch.
        let committed = self
            .git(&["show", &format!("HEAD:{}", GITIGNORE_FILE)])
            .await
            .unwrap_or_default();
        match self.read_gitignore().await {
            Ok(Some(current)) => {
                gitignore::ensure_entries(&committed, entries).as_deref() == Some(current.as_str())
            }
            Ok(None) => false,
            Err(e) => {
                log::warn!("[git] {}", e);
                false
            }
        }
    }

    async fn init(&self) -> Result<(), AppError> {
        self.git(&["init"]).await?;
        log::info!("[git] Initialized repository in {}", self.workdir.display());
        Ok(())
    }
}

/// Parse `git status --porcelain=v2 --branch` output.
///
/// Each changed path is counted once: deletions win over additions, which
/// win over modifications/renames. Unmerged paths are counted nowhere but
/// still make the tree dirty.
pub fn parse_porcelain_v2(output: &str) -> RepositoryStatus {
    let mut status = RepositoryStatus {
        is_clean: true,
        ..Default::default()
    };

    for line in output.lines() {
        if let Some(header) = line.strip_prefix("# ") {
            parse_branch_header(header, &mut status);
            continue;
        }

        let mut fields = line.split(' ');
        match fields.next() {
            Some("1") | Some("2") => {
                status.is_clean = false;
                let xy = fields.next().unwrap_or("..");
                if xy.contains('D') {
                    status.deleted += 1;
                } else if xy.starts_with('A') {
                    status.created += 1;
                } else if xy.chars().any(|c| matches!(c, 'M' | 'R' | 'C' | 'T')) {
                    status.modified += 1;
                }
            }
            Some("?") => {
                status.is_clean = false;
                status.created += 1;
            }
            Some("u") => status.is_clean = false,
            _ => {}
        }
    }

    status
}

fn parse_branch_header(header: &str, status: &mut RepositoryStatus) {
    if let Some(head) = header.strip_prefix("branch.head ") {
        if head != "(detached)" {
            status.current_branch = head.to_string();
        }
    } else if let Some(upstream) = header.strip_prefix("branch.upstream ") {
        status.tracking = Some(upstream.to_string());
    } else if let Some(ab) = header.strip_prefix("branch.ab ") {
        for part in ab.split_whitespace() {
            if let Some(ahead) = part.strip_prefix('+') {
                status.ahead = ahead.parse().unwrap_or(0);
            } else if let Some(behind) = part.strip_prefix('-') {
                status.behind = behind.parse().unwrap_or(0);
            }
        }
    }
}
