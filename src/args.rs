use crate::models::MergeRequestStateFilter;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// GitLab merge requests and Git workflow for a notes vault.
#[derive(Parser, Debug)]
#[command(name = "gitlab-vault", version)]
#[command(about = "Browse GitLab merge requests and drive Git for a notes vault")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Vault (repository) directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Settings file (defaults to settings.json in the user config directory)
    #[arg(long, global = true, env = "GITLAB_VAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateArg {
    #[default]
    Opened,
    Closed,
    Merged,
    All,
}

impl From<StateArg> for MergeRequestStateFilter {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Opened => Self::Opened,
            StateArg::Closed => Self::Closed,
            StateArg::Merged => Self::Merged,
            StateArg::All => Self::All,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List merge requests
    #[command(alias = "mrs")]
    MergeRequests {
        /// State filter
        #[arg(long, value_enum, default_value_t = StateArg::Opened)]
        state: StateArg,
        /// Search titles and descriptions (all states)
        #[arg(long)]
        search: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a merge request with its commits and approvals
    Show {
        iid: i64,
        #[arg(long)]
        json: bool,
    },
    /// Fetch and check out a merge request's source branch
    Checkout { iid: i64 },
    /// Merge a merge request
    Merge {
        iid: i64,
        /// Merge commit message
        #[arg(short, long)]
        message: Option<String>,
        /// Squash commits on merge
        #[arg(long)]
        squash: bool,
    },
    /// Open a merge request for existing branches
    CreateMr {
        #[arg(long)]
        source: String,
        #[arg(long, default_value = crate::models::DEFAULT_TARGET_BRANCH)]
        target: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Stage everything and commit
    Commit {
        /// Commit message (prompted when omitted)
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Push the current branch
    Push,
    /// Pull the current branch
    Pull,
    /// Switch branches, handling uncommitted changes
    SwitchBranch {
        /// Target branch (selected interactively when omitted)
        branch: Option<String>,
    },
    /// Create and check out a new branch
    CreateBranch {
        /// Branch name (prompted when omitted)
        name: Option<String>,
    },
    /// Switch to main, handling uncommitted changes
    CheckoutMain,
    /// Print the status line
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Keep printing the status line until interrupted
    Watch {
        /// Refresh interval in seconds (defaults to the configured interval)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Check the vault's .gitignore
    Gitignore {
        /// Append missing entries
        #[arg(long)]
        fix: bool,
    },
    /// Initialize a Git repository in the vault
    Init,
    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the access token in the system keychain
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current settings (token masked)
    Show,
    /// Set one setting, e.g. `config set projectId group/notes`
    Set { key: String, value: String },
}

#[derive(Subcommand, Debug)]
pub enum TokenAction {
    /// Store a personal access token for the configured GitLab URL
    Set { token: String },
    /// Remove the stored token
    Delete,
}
