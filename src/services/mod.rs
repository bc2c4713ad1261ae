//! Business logic services.
//!
//! This module contains the version-control and GitLab gateways, the branch
//! switch coordinator and settings persistence.
//!
//! Services talk to the user only through the collaborator traits, so they
//! are testable without a terminal.

pub mod branch_switch;
pub mod collaborators;
pub mod credentials;
pub mod git_repository;
pub mod gitignore;
pub mod gitlab_client;
pub mod gitlab_gateway;
pub mod settings_store;

pub use branch_switch::{BranchSwitchCoordinator, Collaborators, SwitchOutcome};
pub use collaborators::{LogNotifier, MergeRequestListView, Notifier, Prompter, StatusDisplay};
pub use credentials::CredentialService;
pub use git_repository::{GitRepository, RepositoryGateway};
pub use gitlab_client::GitLabClient;
pub use gitlab_gateway::{GitLabGateway, RemoteGateway};
pub use settings_store::SettingsStore;
