//! Terminal prompts and notices.

use crate::models::{MergeRequestForm, UncommittedChangesDecision, DEFAULT_TARGET_BRANCH};
use crate::models::switch_decision::slugify;
use crate::services::collaborators::{Notifier, Prompter};
use async_trait::async_trait;
use std::io::{BufRead, Write};

/// Prompts on stderr and reads answers from stdin.
///
/// End of input or an empty answer counts as dismissing the prompt.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    async fn read_line(&self, prompt: String) -> Option<String> {
        let result = tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            write!(stderr, "{}", prompt)?;
            stderr.flush()?;

            let mut line = String::new();
            let read = std::io::stdin().lock().read_line(&mut line)?;
            Ok::<_, std::io::Error>((read > 0).then_some(line))
        })
        .await;

        match result {
            Ok(Ok(line)) => line.map(|l| l.trim().to_string()),
            Ok(Err(e)) => {
                log::warn!("[prompt] Failed to read input: {}", e);
                None
            }
            Err(e) => {
                log::error!("[prompt] Input task failed: {}", e);
                None
            }
        }
    }

    async fn confirm(&self, question: &str) -> bool {
        self.read_line(format!("{} [y/N] ", question))
            .await
            .is_some_and(|answer| matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn prompt_text(&self, title: &str) -> Option<String> {
        self.read_line(format!("{}: ", title))
            .await
            .filter(|text| !text.is_empty())
    }

    async fn prompt_choice(&self) -> UncommittedChangesDecision {
        let menu = "You have uncommitted changes. What do you want to do with them?\n  \
                    1) Create a new merge request\n  \
                    2) Commit and push\n  \
                    3) Discard (cannot be undone)\n  \
                    4) Cancel\n\
                    Choice: ";

        let decision = self
            .read_line(menu.to_string())
            .await
            .and_then(|answer| parse_choice(&answer))
            .unwrap_or(UncommittedChangesDecision::Cancel);

        if decision == UncommittedChangesDecision::Discard
            && !self
                .confirm("You are about to discard ALL uncommitted changes. Continue?")
                .await
        {
            return UncommittedChangesDecision::Cancel;
        }
        decision
    }

    async fn prompt_merge_request_form(&self) -> Option<MergeRequestForm> {
        let title = self.prompt_text("Merge request title").await?;
        let description = self
            .read_line("Description (optional): ".to_string())
            .await
            .unwrap_or_default();

        let suggested = slugify(&title);
        let branch_name = self
            .read_line(format!("Branch name [{}]: ", suggested))
            .await
            .filter(|b| !b.is_empty());
        let target_branch = self
            .read_line(format!("Target branch [{}]: ", DEFAULT_TARGET_BRANCH))
            .await
            .filter(|b| !b.is_empty());

        Some(MergeRequestForm::new(
            title,
            description,
            branch_name,
            target_branch,
        ))
    }

    async fn prompt_branch(&self, branches: &[String], current: &str) -> Option<String> {
        if branches.is_empty() {
            return None;
        }

        let mut menu = String::from("Branches:\n");
        for (i, branch) in branches.iter().enumerate() {
            let marker = if branch == current { '*' } else { ' ' };
            menu.push_str(&format!("{} {:>2}) {}\n", marker, i + 1, branch));
        }
        menu.push_str("Switch to (number or name): ");

        let answer = self.read_line(menu).await?;
        let selected = parse_branch_selection(&answer, branches);
        if selected.is_none() && !answer.is_empty() {
            log::warn!("[prompt] '{}' is not a listed branch", answer);
        }
        selected
    }
}

/// Map a menu answer to a decision. Unknown answers dismiss the prompt.
pub fn parse_choice(answer: &str) -> Option<UncommittedChangesDecision> {
    match answer.trim().to_lowercase().as_str() {
        "1" | "mr" | "merge-request" => Some(UncommittedChangesDecision::CreateMergeRequest),
        "2" | "commit" | "commit-and-push" => Some(UncommittedChangesDecision::CommitAndPush),
        "3" | "discard" => Some(UncommittedChangesDecision::Discard),
        "4" | "cancel" => Some(UncommittedChangesDecision::Cancel),
        _ => None,
    }
}

/// Resolve a 1-based index or an exact branch name.
pub fn parse_branch_selection(answer: &str, branches: &[String]) -> Option<String> {
    let answer = answer.trim();
    if answer.is_empty() {
        return None;
    }

    if let Ok(index) = answer.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| branches.get(i))
            .cloned();
    }

    branches.iter().find(|b| *b == answer).cloned()
}

/// Prints notices to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        log::debug!("[notice] {}", message);
        eprintln!("{}", message);
    }
}
