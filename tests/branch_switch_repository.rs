//! Branch switch coordinator over a real repository with the default
//! ignore entries.

mod common;

use common::{git, head, read, repo_with_commit, write, ScriptedPrompter};
use gitlab_vault_lib::models::settings::DEFAULT_IGNORE_ENTRIES;
use gitlab_vault_lib::models::{PluginSettings, UncommittedChangesDecision};
use gitlab_vault_lib::services::{
    BranchSwitchCoordinator, Collaborators, GitLabGateway, GitRepository, LogNotifier,
    SwitchOutcome,
};
use gitlab_vault_lib::ui::StatusBar;
use std::path::Path;
use std::sync::Arc;

fn default_entries() -> Vec<String> {
    DEFAULT_IGNORE_ENTRIES.iter().map(|e| e.to_string()).collect()
}

fn coordinator(dir: &Path, prompter: Arc<ScriptedPrompter>) -> BranchSwitchCoordinator {
    let repository = Arc::new(GitRepository::new(dir));
    let notifier = Arc::new(LogNotifier);
    let remote = Arc::new(GitLabGateway::from_settings(
        &PluginSettings::default(),
        notifier.clone(),
    ));
    let collaborators = Collaborators {
        prompter,
        notifier,
        status: Arc::new(StatusBar::new(repository.clone())),
    };

    BranchSwitchCoordinator::new(repository, remote, collaborators, dir)
        .with_ignore_entries(default_entries())
}

/// Committed vault on `main` with a second branch `other`.
fn vault() -> tempfile::TempDir {
    let dir = repo_with_commit();
    git(dir.path(), &["branch", "other"]);
    dir
}

#[tokio::test]
async fn test_clean_vault_switches_without_prompt() {
    let dir = vault();
    let prompter = Arc::new(ScriptedPrompter::new(UncommittedChangesDecision::Cancel));
    let coordinator = coordinator(dir.path(), prompter.clone());

    assert!(coordinator.switch_to("other").await.is_switched());
    assert_eq!(prompter.choices_asked(), 0);
    assert_eq!(head(dir.path()), "other");

    let gitignore = read(dir.path(), ".gitignore");
    for entry in default_entries() {
        assert!(gitignore.contains(&entry), "missing {}", entry);
    }

    // The appended entries alone do not count as the user's changes.
    assert!(coordinator.switch_to("main").await.is_switched());
    assert_eq!(prompter.choices_asked(), 0);
    assert_eq!(head(dir.path()), "main");
}

#[tokio::test]
async fn test_cancel_leaves_vault_untouched() {
    let dir = vault();
    write(dir.path(), "note.md", "# Inbox\nunsaved thought\n");
    let prompter = Arc::new(ScriptedPrompter::new(UncommittedChangesDecision::Cancel));

    let outcome = coordinator(dir.path(), prompter.clone()).switch_to("other").await;

    assert!(matches!(outcome, SwitchOutcome::Cancelled));
    assert_eq!(prompter.choices_asked(), 1);
    assert_eq!(head(dir.path()), "main");
    assert!(!dir.path().join(".gitignore").exists());
    assert_eq!(read(dir.path(), "note.md"), "# Inbox\nunsaved thought\n");
}

#[tokio::test]
async fn test_discard_keeps_ignore_entries() {
    let dir = vault();
    write(dir.path(), "note.md", "scribbles\n");
    write(dir.path(), "Drafts/tmp.md", "tmp\n");
    let prompter = Arc::new(ScriptedPrompter::new(UncommittedChangesDecision::Discard));

    let outcome = coordinator(dir.path(), prompter).switch_to("other").await;

    assert!(outcome.is_switched());
    assert_eq!(head(dir.path()), "other");
    assert_eq!(read(dir.path(), "note.md"), "# Inbox\n");
    assert!(!dir.path().join("Drafts").exists());
    assert!(read(dir.path(), ".gitignore").contains(".obsidian/workspace.json"));
}

#[tokio::test]
async fn test_user_edit_to_gitignore_still_prompts() {
    let dir = vault();
    write(dir.path(), ".gitignore", "private/\n");
    let prompter = Arc::new(ScriptedPrompter::new(UncommittedChangesDecision::Cancel));

    let outcome = coordinator(dir.path(), prompter.clone()).switch_to("other").await;

    assert!(matches!(outcome, SwitchOutcome::Cancelled));
    assert_eq!(prompter.choices_asked(), 1);
    assert_eq!(read(dir.path(), ".gitignore"), "private/\n");
}
