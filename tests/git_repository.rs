//! Repository gateway tests against real temporary repositories.

mod common;

use common::{git, head, init_repo, read, repo_with_commit, repo_with_origin, write};
use gitlab_vault_lib::error::AppError;
use gitlab_vault_lib::services::{GitRepository, RepositoryGateway};
use tempfile::tempdir;

fn entries() -> Vec<String> {
    vec![
        ".obsidian/workspace.json".to_string(),
        ".obsidian/plugins/*/data.json".to_string(),
    ]
}

#[tokio::test]
async fn test_plain_directory_degrades_to_defaults() {
    let dir = tempdir().unwrap();
    let repo = GitRepository::new(dir.path());

    assert!(!repo.is_repository().await);
    assert!(repo.get_branches().await.is_empty());
    assert_eq!(repo.get_current_branch().await, "unknown");
    assert!(!repo.has_uncommitted_changes().await);
    assert!(matches!(
        repo.get_status().await,
        Err(AppError::Repository { .. })
    ));
}

#[tokio::test]
async fn test_init_creates_repository() {
    let dir = tempdir().unwrap();
    let repo = GitRepository::new(dir.path());

    repo.init().await.unwrap();
    assert!(repo.is_repository().await);
}

#[tokio::test]
async fn test_status_of_unborn_branch_uses_header() {
    let dir = init_repo();
    let status = GitRepository::new(dir.path()).get_status().await.unwrap();

    assert_eq!(status.current_branch, "main");
    assert!(status.is_clean);
}

#[tokio::test]
async fn test_clean_status() {
    let dir = repo_with_commit();
    let repo = GitRepository::new(dir.path());

    let status = repo.get_status().await.unwrap();
    assert_eq!(status.current_branch, "main");
    assert!(status.is_clean);
    assert!(status.tracking.is_none());
    assert_eq!(status.change_count(), 0);
    assert!(!repo.has_uncommitted_changes().await);
}

#[tokio::test]
async fn test_status_counts_changes() {
    let dir = repo_with_commit();
    write(dir.path(), "todo.md", "- [ ] call\n");
    git(dir.path(), &["add", "todo.md"]);
    git(dir.path(), &["commit", "--quiet", "-m", "Add todo"]);

    write(dir.path(), "note.md", "# Inbox\n\nchanged\n");
    write(dir.path(), "ideas.md", "new\n");
    std::fs::remove_file(dir.path().join("todo.md")).unwrap();

    let repo = GitRepository::new(dir.path());
    let status = repo.get_status().await.unwrap();
    assert!(!status.is_clean);
    assert_eq!(status.modified, 1);
    assert_eq!(status.created, 1);
    assert_eq!(status.deleted, 1);
    assert!(repo.has_uncommitted_changes().await);
}

#[tokio::test]
async fn test_commit_stages_everything() {
    let dir = repo_with_commit();
    write(dir.path(), "Daily/2024-03-01.md", "today\n");
    write(dir.path(), "note.md", "# Inbox\nmore\n");

    let repo = GitRepository::new(dir.path());
    repo.commit("Daily note").await.unwrap();

    assert!(repo.get_status().await.unwrap().is_clean);
    let log = git(dir.path(), &["log", "-1", "--format=%s"]);
    assert_eq!(log.trim(), "Daily note");
}

#[tokio::test]
async fn test_commit_with_nothing_to_commit_fails() {
    let dir = repo_with_commit();
    let result = GitRepository::new(dir.path()).commit("Nothing").await;

    match result {
        Err(AppError::Repository { message, .. }) => {
            assert!(message.contains("nothing"), "unexpected message: {}", message)
        }
        other => panic!("expected repository error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_branch_lifecycle() {
    let dir = repo_with_commit();
    let repo = GitRepository::new(dir.path());

    repo.create_branch("notes/weekly").await.unwrap();
    assert_eq!(repo.get_current_branch().await, "notes/weekly");
    assert_eq!(repo.get_branches().await, vec!["main", "notes/weekly"]);

    repo.switch_branch("main").await.unwrap();
    assert_eq!(head(dir.path()), "main");

    repo.delete_branch("notes/weekly").await.unwrap();
    assert_eq!(repo.get_branches().await, vec!["main"]);
}

#[tokio::test]
async fn test_switch_to_missing_branch_fails() {
    let dir = repo_with_commit();
    let result = GitRepository::new(dir.path()).switch_branch("nope").await;
    assert!(matches!(result, Err(AppError::Repository { .. })));
    assert_eq!(head(dir.path()), "main");
}

#[tokio::test]
async fn test_option_like_branch_names_are_rejected() {
    let dir = repo_with_commit();
    write(dir.path(), "note.md", "keep me\n");
    let repo = GitRepository::new(dir.path());

    // "-f" would otherwise reach git as a force flag and drop the edit.
    let result = repo.switch_branch("-f").await;
    assert!(matches!(result, Err(AppError::InvalidInput { .. })));
    assert_eq!(read(dir.path(), "note.md"), "keep me\n");

    assert!(matches!(
        repo.create_branch("--orphan").await,
        Err(AppError::InvalidInput { .. })
    ));
    assert!(matches!(
        repo.delete_branch("-D").await,
        Err(AppError::InvalidInput { .. })
    ));
    assert!(matches!(
        repo.create_branch("  ").await,
        Err(AppError::InvalidInput { .. })
    ));
    assert_eq!(head(dir.path()), "main");
    assert_eq!(repo.get_branches().await, vec!["main"]);
}

#[tokio::test]
async fn test_discard_changes() {
    let dir = repo_with_commit();
    write(dir.path(), "note.md", "scribbles\n");
    write(dir.path(), "Drafts/tmp.md", "tmp\n");

    let repo = GitRepository::new(dir.path());
    repo.discard_changes().await.unwrap();

    assert!(repo.get_status().await.unwrap().is_clean);
    assert_eq!(read(dir.path(), "note.md"), "# Inbox\n");
    assert!(!dir.path().join("Drafts").exists());
}

#[tokio::test]
async fn test_gitignore_maintenance_is_idempotent() {
    let dir = repo_with_commit();
    write(dir.path(), ".gitignore", "node_modules/\n.obsidian/workspace.json\n");
    let repo = GitRepository::new(dir.path());

    let before = repo.check_gitignore(&entries()).await.unwrap();
    assert!(before.exists);
    assert!(before.needs_fix());
    assert_eq!(
        before.missing().collect::<Vec<_>>(),
        vec![".obsidian/plugins/*/data.json"]
    );

    repo.ensure_gitignore(&entries()).await.unwrap();
    let first = read(dir.path(), ".gitignore");
    repo.ensure_gitignore(&entries()).await.unwrap();
    let second = read(dir.path(), ".gitignore");

    assert_eq!(first, second);
    assert!(first.starts_with("node_modules/\n.obsidian/workspace.json\n"));
    assert_eq!(first.matches(".obsidian/workspace.json").count(), 1);
    assert!(!repo.check_gitignore(&entries()).await.unwrap().needs_fix());
}

#[tokio::test]
async fn test_gitignore_created_when_missing() {
    let dir = repo_with_commit();
    let repo = GitRepository::new(dir.path());

    let status = repo.check_gitignore(&entries()).await.unwrap();
    assert!(!status.exists);

    repo.ensure_gitignore(&entries()).await.unwrap();
    let content = read(dir.path(), ".gitignore");
    assert!(content.starts_with("# Added by gitlab-vault\n.obsidian/workspace.json\n"));
    assert!(content.ends_with(".obsidian/plugins/*/data.json\n"));
}

#[tokio::test]
async fn test_appended_gitignore_alone_is_not_a_user_change() {
    let dir = repo_with_commit();
    let repo = GitRepository::new(dir.path());

    repo.ensure_gitignore(&entries()).await.unwrap();
    assert!(repo.has_uncommitted_changes().await);
    assert!(repo.only_gitignore_entries_pending(&entries()).await);

    write(dir.path(), "note.md", "edited\n");
    assert!(!repo.only_gitignore_entries_pending(&entries()).await);
}

#[tokio::test]
async fn test_hand_edited_gitignore_is_a_user_change() {
    let dir = repo_with_commit();
    write(dir.path(), ".gitignore", "node_modules/\n");
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "--quiet", "-m", "Ignore modules"]);
    let repo = GitRepository::new(dir.path());

    repo.ensure_gitignore(&entries()).await.unwrap();
    assert!(repo.only_gitignore_entries_pending(&entries()).await);

    write(
        dir.path(),
        ".gitignore",
        &format!("{}private/\n", read(dir.path(), ".gitignore")),
    );
    assert!(!repo.only_gitignore_entries_pending(&entries()).await);
}

#[tokio::test]
async fn test_commit_and_push() {
    let (dir, origin) = repo_with_origin();
    write(dir.path(), "note.md", "# Inbox\npushed\n");

    let repo = GitRepository::new(dir.path());
    repo.commit_and_push("Update inbox").await.unwrap();

    let local = git(dir.path(), &["rev-parse", "HEAD"]);
    let remote = git(origin.path(), &["rev-parse", "main"]);
    assert_eq!(local, remote);

    let status = repo.get_status().await.unwrap();
    assert_eq!(status.tracking.as_deref(), Some("origin/main"));
    assert_eq!(status.ahead, 0);
}

#[tokio::test]
async fn test_commit_survives_failed_push() {
    let dir = repo_with_commit();
    write(dir.path(), "note.md", "# Inbox\nlocal only\n");

    let repo = GitRepository::new(dir.path());
    let result = repo.commit_and_push("Local change").await;

    assert!(matches!(result, Err(AppError::Repository { .. })));
    let log = git(dir.path(), &["log", "-1", "--format=%s"]);
    assert_eq!(log.trim(), "Local change");
    assert!(repo.get_status().await.unwrap().is_clean);
}

#[tokio::test]
async fn test_ahead_of_upstream() {
    let (dir, _origin) = repo_with_origin();
    write(dir.path(), "note.md", "# Inbox\nunpushed\n");
    git(dir.path(), &["commit", "--quiet", "-am", "Unpushed"]);

    let status = GitRepository::new(dir.path()).get_status().await.unwrap();
    assert_eq!(status.ahead, 1);
    assert_eq!(status.behind, 0);
    assert!(status.is_clean);
}

#[tokio::test]
async fn test_pull_fast_forwards() {
    let (dir, origin) = repo_with_origin();

    // A second clone pushes a change that the first one pulls.
    let other = tempdir().unwrap();
    let origin_path = origin.path().to_string_lossy().into_owned();
    git(other.path(), &["clone", "--quiet", &origin_path, "."]);
    git(other.path(), &["config", "user.name", "Other"]);
    git(other.path(), &["config", "user.email", "other@example.com"]);
    write(other.path(), "remote.md", "from elsewhere\n");
    git(other.path(), &["add", "-A"]);
    git(other.path(), &["commit", "--quiet", "-m", "Remote change"]);
    git(other.path(), &["push", "--quiet"]);

    GitRepository::new(dir.path()).pull().await.unwrap();
    assert_eq!(read(dir.path(), "remote.md"), "from elsewhere\n");
}
