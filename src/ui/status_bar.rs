//! Repository status line.
//!
//! Renders branch, upstream sync and change counts as a single line, the way
//! a host status bar would show them, and keeps that line fresh on a timer.

use crate::models::{GitignoreStatus, RepositoryStatus};
use crate::services::collaborators::StatusDisplay;
use crate::services::git_repository::RepositoryGateway;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Text shown when the status query fails.
pub const STATUS_ERROR_TEXT: &str = "Git: Error";

/// One-line status, e.g. `⎇ main | ↑1 ↓2 | ~3 +1 -1`.
pub fn render_status(status: &RepositoryStatus) -> String {
    let mut parts = vec![format!("⎇ {}", status.current_branch)];

    if status.tracking.is_some() && (status.ahead > 0 || status.behind > 0) {
        let mut sync = Vec::new();
        if status.ahead > 0 {
            sync.push(format!("↑{}", status.ahead));
        }
        if status.behind > 0 {
            sync.push(format!("↓{}", status.behind));
        }
        parts.push(sync.join(" "));
    }

    if !status.is_clean {
        let mut changes = Vec::new();
        if status.modified > 0 {
            changes.push(format!("~{}", status.modified));
        }
        if status.created > 0 {
            changes.push(format!("+{}", status.created));
        }
        if status.deleted > 0 {
            changes.push(format!("-{}", status.deleted));
        }
        if !changes.is_empty() {
            parts.push(changes.join(" "));
        }
    }

    parts.join(" | ")
}

/// Multi-line detail for the status line.
pub fn status_tooltip(status: &RepositoryStatus) -> String {
    let mut lines = vec![format!("Branch: {}", status.current_branch)];

    if let Some(tracking) = &status.tracking {
        lines.push(format!("Tracking: {}", tracking));
        if status.ahead > 0 {
            lines.push(format!("Ahead: {} commits", status.ahead));
        }
        if status.behind > 0 {
            lines.push(format!("Behind: {} commits", status.behind));
        }
    }

    if status.is_clean {
        lines.push("Working tree clean".to_string());
    } else {
        for (label, count) in [
            ("Modified", status.modified),
            ("Created", status.created),
            ("Deleted", status.deleted),
        ] {
            if count > 0 {
                lines.push(format!("{}: {}", label, count));
            }
        }
    }

    lines.join("\n")
}

/// `✓ .gitignore` when all entries are present, otherwise a warning listing
/// what is missing.
pub fn render_gitignore(status: &GitignoreStatus) -> String {
    if !status.needs_fix() {
        return "✓ .gitignore".to_string();
    }

    if !status.exists {
        return "⚠ .gitignore (missing)".to_string();
    }

    let missing: Vec<&str> = status.missing().collect();
    format!("⚠ .gitignore (not ignored: {})", missing.join(", "))
}

type UpdateHook = Box<dyn Fn(&str) + Send + Sync>;

/// Status line backed by a [`RepositoryGateway`].
///
/// Overlapping refreshes are not prevented; whichever finishes last decides
/// the displayed text.
pub struct StatusBar {
    repository: Arc<dyn RepositoryGateway>,
    ignore_entries: Vec<String>,
    text: RwLock<String>,
    tooltip: RwLock<String>,
    gitignore: RwLock<String>,
    on_update: Option<UpdateHook>,
}

impl StatusBar {
    pub fn new(repository: Arc<dyn RepositoryGateway>) -> Self {
        Self {
            repository,
            ignore_entries: Vec::new(),
            text: RwLock::new(String::new()),
            tooltip: RwLock::new(String::new()),
            gitignore: RwLock::new(String::new()),
            on_update: None,
        }
    }

    /// Also track these ignore-file entries.
    pub fn with_ignore_entries(mut self, entries: Vec<String>) -> Self {
        self.ignore_entries = entries;
        self
    }

    /// Called with the status line, followed by the ignore-file indicator
    /// when one is tracked, whenever a refresh changes either.
    pub fn on_update(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    pub async fn text(&self) -> String {
        self.text.read().await.clone()
    }

    pub async fn tooltip(&self) -> String {
        self.tooltip.read().await.clone()
    }

    /// Ignore-file indicator; empty when no entries are tracked or outside
    /// a repository.
    pub async fn gitignore_text(&self) -> String {
        self.gitignore.read().await.clone()
    }

    async fn compute(&self) -> (String, String, String) {
        if !self.repository.is_repository().await {
            return Default::default();
        }

        let (text, tooltip) = match self.repository.get_status().await {
            Ok(status) => (render_status(&status), status_tooltip(&status)),
            Err(e) => {
                log::warn!("[status] Failed to update git status: {}", e);
                (STATUS_ERROR_TEXT.to_string(), e.to_string())
            }
        };

        let gitignore = if self.ignore_entries.is_empty() {
            String::new()
        } else {
            match self.repository.check_gitignore(&self.ignore_entries).await {
                Ok(status) => render_gitignore(&status),
                Err(e) => {
                    log::warn!("[status] Failed to check .gitignore: {}", e);
                    String::new()
                }
            }
        };

        (text, tooltip, gitignore)
    }

    /// Refresh every `period` until the returned handle is stopped.
    ///
    /// The first refresh runs immediately.
    pub fn start(self: &Arc<Self>, period: Duration) -> StatusRefresher {
        let cancel_token = CancellationToken::new();
        let cancelled = cancel_token.clone();
        let bar = Arc::clone(self);

        let task = tokio::spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = interval.tick() => bar.refresh().await,
                }
            }
            log::debug!("[status] Refresher stopped");
        });

        log::debug!("[status] Refreshing every {:?}", period);
        StatusRefresher { cancel_token, task }
    }
}

#[async_trait]
impl StatusDisplay for StatusBar {
    async fn refresh(&self) {
        let (text, tooltip, gitignore) = self.compute().await;

        let mut changed = {
            let mut current = self.text.write().await;
            let changed = *current != text;
            *current = text.clone();
            changed
        };
        *self.tooltip.write().await = tooltip;
        {
            let mut current = self.gitignore.write().await;
            changed |= *current != gitignore;
            *current = gitignore.clone();
        }

        if changed {
            if let Some(hook) = &self.on_update {
                if gitignore.is_empty() {
                    hook(&text);
                } else {
                    hook(&format!("{}  {}", text, gitignore));
                }
            }
        }
    }
}

/// Handle to a running periodic refresh.
pub struct StatusRefresher {
    cancel_token: CancellationToken,
    task: JoinHandle<()>,
}

impl StatusRefresher {
    /// Stop refreshing and wait for the task to finish.
    pub async fn stop(self) {
        self.cancel_token.cancel();
        if let Err(e) = self.task.await {
            log::error!("[status] Refresher task failed: {}", e);
        }
    }
}
