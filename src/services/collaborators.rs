//! Interfaces to the user-facing surfaces the core drives.
//!
//! The core never talks to a terminal or window directly; it asks a
//! [`Prompter`] for decisions, tells a [`Notifier`] what happened and pokes
//! a [`StatusDisplay`] after every mutation.

use crate::models::{MergeRequestForm, UncommittedChangesDecision};
use async_trait::async_trait;

/// Solicits input from the user.
///
/// Every method resolves exactly once; dismissing a prompt without a
/// selection resolves to `None` / [`UncommittedChangesDecision::Cancel`].
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Ask for a line of text.
    async fn prompt_text(&self, title: &str) -> Option<String>;

    /// Ask what to do with uncommitted changes.
    async fn prompt_choice(&self) -> UncommittedChangesDecision;

    /// Ask for the details of a new merge request.
    async fn prompt_merge_request_form(&self) -> Option<MergeRequestForm>;

    /// Let the user pick one of `branches`.
    async fn prompt_branch(&self, branches: &[String], current: &str) -> Option<String>;
}

/// Fire-and-forget user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Something showing repository status that can be told to refresh.
#[async_trait]
pub trait StatusDisplay: Send + Sync {
    /// Recompute and redraw. Safe to call after every mutating operation.
    async fn refresh(&self);
}

/// The merge request list, when one is shown.
#[async_trait]
pub trait MergeRequestListView: Send + Sync {
    fn is_open(&self) -> bool;

    async fn reload(&self);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        log::info!("{}", message);
    }
}
