//! Application context shared by the commands.

use crate::error::AppError;
use crate::models::PluginSettings;
use crate::services::branch_switch::{BranchSwitchCoordinator, Collaborators};
use crate::services::collaborators::{Notifier, Prompter, StatusDisplay};
use crate::services::credentials::CredentialService;
use crate::services::git_repository::{GitRepository, RepositoryGateway};
use crate::services::gitlab_gateway::{GitLabGateway, RemoteGateway};
use crate::services::settings_store::SettingsStore;
use crate::ui::{StatusBar, TerminalNotifier, TerminalPrompter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything a command needs: settings, gateways, collaborators and the
/// branch switch coordinator.
///
/// The remote gateway is rebuilt, never mutated, when settings change.
pub struct AppContext {
    settings: PluginSettings,
    store: SettingsStore,
    workdir: PathBuf,
    repository: Arc<dyn RepositoryGateway>,
    remote: Arc<dyn RemoteGateway>,
    prompter: Arc<dyn Prompter>,
    notifier: Arc<dyn Notifier>,
    status_bar: Arc<StatusBar>,
    coordinator: BranchSwitchCoordinator,
}

impl AppContext {
    /// Load settings from `store` and wire up the terminal collaborators.
    pub async fn load(workdir: impl Into<PathBuf>, store: SettingsStore) -> Result<Self, AppError> {
        let settings = store.load().await?;
        log::debug!("[app] Loaded settings from {}", store.path().display());

        Ok(Self::new(
            settings,
            store,
            workdir,
            Arc::new(TerminalPrompter),
            Arc::new(TerminalNotifier),
        ))
    }

    pub fn new(
        settings: PluginSettings,
        store: SettingsStore,
        workdir: impl Into<PathBuf>,
        prompter: Arc<dyn Prompter>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let workdir = workdir.into();
        let repository: Arc<dyn RepositoryGateway> = Arc::new(GitRepository::new(&workdir));
        let remote = Self::build_remote(&settings, &notifier);
        let status_bar = Arc::new(Self::status_bar_for(&settings, &repository));

        let coordinator = Self::build_coordinator(
            &settings,
            &workdir,
            repository.clone(),
            remote.clone(),
            Collaborators {
                prompter: prompter.clone(),
                notifier: notifier.clone(),
                status: status_bar.clone(),
            },
        );

        Self {
            settings,
            store,
            workdir,
            repository,
            remote,
            prompter,
            notifier,
            status_bar,
            coordinator,
        }
    }

    fn status_bar_for(
        settings: &PluginSettings,
        repository: &Arc<dyn RepositoryGateway>,
    ) -> StatusBar {
        StatusBar::new(repository.clone()).with_ignore_entries(settings.ignore_entries.clone())
    }

    /// A fresh status bar over this vault tracking the configured ignore
    /// entries.
    pub fn build_status_bar(&self) -> StatusBar {
        Self::status_bar_for(&self.settings, &self.repository)
    }

    fn build_remote(settings: &PluginSettings, notifier: &Arc<dyn Notifier>) -> Arc<dyn RemoteGateway> {
        let mut effective = settings.clone();
        CredentialService::resolve_token(&mut effective);
        Arc::new(GitLabGateway::from_settings(&effective, notifier.clone()))
    }

    fn build_coordinator(
        settings: &PluginSettings,
        workdir: &Path,
        repository: Arc<dyn RepositoryGateway>,
        remote: Arc<dyn RemoteGateway>,
        collaborators: Collaborators,
    ) -> BranchSwitchCoordinator {
        BranchSwitchCoordinator::new(repository, remote, collaborators, workdir)
            .with_ignore_entries(settings.ignore_entries.clone())
    }

    /// Settings as stored, without any keychain token filled in.
    pub fn settings(&self) -> &PluginSettings {
        &self.settings
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn repository(&self) -> &dyn RepositoryGateway {
        self.repository.as_ref()
    }

    pub fn remote(&self) -> &dyn RemoteGateway {
        self.remote.as_ref()
    }

    pub fn prompter(&self) -> &dyn Prompter {
        self.prompter.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn status_bar(&self) -> &Arc<StatusBar> {
        &self.status_bar
    }

    pub fn coordinator(&self) -> &BranchSwitchCoordinator {
        &self.coordinator
    }

    /// Redraw the status line after a mutation.
    pub async fn refresh_status(&self) {
        self.status_bar.refresh().await;
    }

    /// Rebuild the remote gateway from the current settings.
    pub fn reinitialize_clients(&mut self) {
        log::info!("[app] Reinitializing GitLab client");
        self.remote = Self::build_remote(&self.settings, &self.notifier);
        self.coordinator.set_remote(self.remote.clone());
    }

    /// Change one setting, persist it and reinitialize the clients.
    pub async fn update_setting(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        let mut updated = self.settings.clone();
        SettingsStore::apply(&mut updated, key, value)?;
        self.store.save(&updated).await?;

        let entries_changed = updated.ignore_entries != self.settings.ignore_entries;
        self.settings = updated;

        if entries_changed {
            // Ignore entries are baked into the status bar and coordinator.
            self.status_bar = Arc::new(self.build_status_bar());
            let collaborators = Collaborators {
                prompter: self.prompter.clone(),
                notifier: self.notifier.clone(),
                status: self.status_bar.clone(),
            };
            self.coordinator = Self::build_coordinator(
                &self.settings,
                &self.workdir,
                self.repository.clone(),
                self.remote.clone(),
                collaborators,
            );
        }

        self.reinitialize_clients();
        Ok(())
    }
}
