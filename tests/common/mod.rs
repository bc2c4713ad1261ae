//! Shared helpers for the integration tests: throwaway Git repositories
//! driven by the real `git` binary.

#![allow(dead_code)]

use async_trait::async_trait;
use gitlab_vault_lib::models::{MergeRequestForm, UncommittedChangesDecision};
use gitlab_vault_lib::services::Prompter;
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Run git in `dir`, panicking with its stderr on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Empty repository on branch `main` with a local identity.
pub fn init_repo() -> TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    git(dir.path(), &["init", "--quiet"]);
    git(dir.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(dir.path(), &["config", "user.name", "Vault Tester"]);
    git(dir.path(), &["config", "user.email", "vault@example.com"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);
    dir
}

/// Repository on `main` with one commit containing `note.md`.
pub fn repo_with_commit() -> TempDir {
    let dir = init_repo();
    write(dir.path(), "note.md", "# Inbox\n");
    git(dir.path(), &["add", "-A"]);
    git(dir.path(), &["commit", "--quiet", "-m", "Initial note"]);
    dir
}

/// A committed repository whose `origin` is a local bare repository that
/// already has `main`. Returns `(workdir, origin)`.
pub fn repo_with_origin() -> (TempDir, TempDir) {
    let dir = repo_with_commit();
    let origin = tempfile::tempdir().expect("failed to create temp dir");
    git(origin.path(), &["init", "--quiet", "--bare"]);
    git(origin.path(), &["symbolic-ref", "HEAD", "refs/heads/main"]);

    let origin_path = origin.path().to_string_lossy().into_owned();
    git(dir.path(), &["remote", "add", "origin", &origin_path]);
    git(dir.path(), &["push", "--quiet", "--set-upstream", "origin", "main"]);
    (dir, origin)
}

pub fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create parent dir");
    }
    std::fs::write(path, content).expect("failed to write file");
}

pub fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).expect("failed to read file")
}

/// Branch checked out in `dir`.
pub fn head(dir: &Path) -> String {
    git(dir, &["rev-parse", "--abbrev-ref", "HEAD"]).trim().to_string()
}

/// Prompter answering from fixed values and counting decision prompts.
pub struct ScriptedPrompter {
    pub choice: UncommittedChangesDecision,
    pub text: Option<String>,
    pub form: Option<MergeRequestForm>,
    choices_asked: AtomicUsize,
}

impl ScriptedPrompter {
    pub fn new(choice: UncommittedChangesDecision) -> Self {
        Self {
            choice,
            text: None,
            form: None,
            choices_asked: AtomicUsize::new(0),
        }
    }

    /// How many times the uncommitted-changes menu was shown.
    pub fn choices_asked(&self) -> usize {
        self.choices_asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn prompt_text(&self, _title: &str) -> Option<String> {
        self.text.clone()
    }

    async fn prompt_choice(&self) -> UncommittedChangesDecision {
        self.choices_asked.fetch_add(1, Ordering::SeqCst);
        self.choice
    }

    async fn prompt_merge_request_form(&self) -> Option<MergeRequestForm> {
        self.form.clone()
    }

    async fn prompt_branch(&self, _branches: &[String], _current: &str) -> Option<String> {
        None
    }
}
