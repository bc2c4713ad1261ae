//! Local Git commands.

use super::print_json;
use crate::app::AppContext;
use crate::error::AppError;
use crate::models::DEFAULT_TARGET_BRANCH;
use crate::services::collaborators::StatusDisplay;
use crate::services::SwitchOutcome;
use crate::ui::status_bar::{render_gitignore, render_status, status_tooltip};
use std::sync::Arc;
use std::time::Duration;

const NO_REPOSITORY: &str = "No Git repository found";

/// Notify and return `false` when the vault is not a repository.
async fn require_repository(ctx: &AppContext) -> bool {
    if ctx.repository().is_repository().await {
        return true;
    }
    ctx.notifier()
        .notify(&format!("{} in {}", NO_REPOSITORY, ctx.workdir().display()));
    false
}

pub async fn commit(ctx: &AppContext, message: Option<String>) -> Result<bool, AppError> {
    let message = match message.filter(|m| !m.trim().is_empty()) {
        Some(message) => message,
        None => match ctx.prompter().prompt_text("Commit message").await {
            Some(message) => message,
            None => return Ok(false),
        },
    };

    ctx.repository().commit(message.trim()).await?;
    ctx.refresh_status().await;
    ctx.notifier().notify("Commit created");
    Ok(true)
}

pub async fn push(ctx: &AppContext) -> Result<bool, AppError> {
    ctx.repository().push().await?;
    ctx.refresh_status().await;
    ctx.notifier().notify("Pushed");
    Ok(true)
}

pub async fn pull(ctx: &AppContext) -> Result<bool, AppError> {
    ctx.repository().pull().await?;
    ctx.refresh_status().await;
    ctx.notifier().notify("Pulled");
    Ok(true)
}

/// Switch through the coordinator, offering a branch list when no target
/// is given.
pub async fn switch_branch(ctx: &AppContext, branch: Option<String>) -> Result<bool, AppError> {
    if !require_repository(ctx).await {
        return Ok(false);
    }

    let target = match branch.filter(|b| !b.trim().is_empty()) {
        Some(branch) => branch,
        None => {
            let branches = ctx.repository().get_branches().await;
            let current = ctx.repository().get_current_branch().await;
            match ctx.prompter().prompt_branch(&branches, &current).await {
                Some(branch) => branch,
                None => return Ok(false),
            }
        }
    };

    Ok(report_switch(ctx, &target, ctx.coordinator().switch_to(&target).await))
}

pub async fn checkout_main(ctx: &AppContext) -> Result<bool, AppError> {
    if !require_repository(ctx).await {
        return Ok(false);
    }

    let outcome = ctx.coordinator().switch_to(DEFAULT_TARGET_BRANCH).await;
    Ok(report_switch(ctx, DEFAULT_TARGET_BRANCH, outcome))
}

pub(crate) fn report_switch(ctx: &AppContext, target: &str, outcome: SwitchOutcome) -> bool {
    if outcome.is_switched() {
        ctx.notifier()
            .notify(&format!("Switched to branch '{}'", target));
    }
    outcome.is_switched()
}

pub async fn create_branch(ctx: &AppContext, name: Option<String>) -> Result<bool, AppError> {
    let name = match name.filter(|n| !n.trim().is_empty()) {
        Some(name) => name,
        None => match ctx.prompter().prompt_text("Branch name").await {
            Some(name) => name,
            None => return Ok(false),
        },
    };

    ctx.repository().create_branch(name.trim()).await?;
    ctx.refresh_status().await;
    ctx.notifier()
        .notify(&format!("Created and switched to branch '{}'", name.trim()));
    Ok(true)
}

pub async fn status(ctx: &AppContext, json: bool) -> Result<bool, AppError> {
    if !require_repository(ctx).await {
        return Ok(false);
    }

    let status = ctx.repository().get_status().await?;
    if json {
        print_json(&status)?;
        return Ok(true);
    }

    println!("{}", render_status(&status));
    println!();
    println!("{}", status_tooltip(&status));

    let entries = &ctx.settings().ignore_entries;
    if !entries.is_empty() {
        let gitignore = ctx.repository().check_gitignore(entries).await?;
        println!();
        println!("{}", render_gitignore(&gitignore));
    }
    Ok(true)
}

/// Print the status line whenever it changes until Ctrl-C.
pub async fn watch(ctx: &AppContext, interval: Option<u64>) -> Result<bool, AppError> {
    let secs = interval
        .unwrap_or(ctx.settings().refresh_interval_secs)
        .max(1);

    let bar = Arc::new(ctx.build_status_bar().on_update(|line| {
        let now = chrono::Local::now().format("%H:%M:%S");
        if line.is_empty() {
            println!("[{}] ({})", now, NO_REPOSITORY);
        } else {
            println!("[{}] {}", now, line);
        }
    }));

    let refresher = bar.start(Duration::from_secs(secs));
    let interrupted = tokio::signal::ctrl_c().await;
    refresher.stop().await;

    interrupted.map_err(|e| AppError::internal(format!("Failed to wait for Ctrl-C: {}", e)))?;
    Ok(true)
}

pub async fn gitignore(ctx: &AppContext, fix: bool) -> Result<bool, AppError> {
    if !require_repository(ctx).await {
        return Ok(false);
    }

    let entries = &ctx.settings().ignore_entries;
    if fix {
        ctx.repository().ensure_gitignore(entries).await?;
        ctx.refresh_status().await;
        ctx.notifier().notify(".gitignore updated");
    }

    let status = ctx.repository().check_gitignore(entries).await?;
    println!("{}", render_gitignore(&status));
    for (entry, present) in &status.entries {
        println!("  {} {}", if *present { '✓' } else { '✗' }, entry);
    }

    Ok(!status.needs_fix())
}

pub async fn init(ctx: &AppContext) -> Result<bool, AppError> {
    ctx.repository().init().await?;
    ctx.status_bar().refresh().await;
    ctx.notifier().notify(&format!(
        "Initialized Git repository in {}",
        ctx.workdir().display()
    ));
    Ok(true)
}
