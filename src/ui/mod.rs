//! Terminal implementations of the collaborator traits.

pub mod prompt;
pub mod status_bar;

pub use prompt::{TerminalNotifier, TerminalPrompter};
pub use status_bar::{StatusBar, StatusRefresher};
