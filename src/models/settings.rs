//! Persisted plugin settings.

use serde::{Deserialize, Serialize};

/// Default GitLab instance.
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// Default status refresh interval in seconds.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 10;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Vault files that must never be committed.
pub const DEFAULT_IGNORE_ENTRIES: [&str; 2] =
    [".obsidian/workspace.json", ".obsidian/plugins/*/data.json"];

/// User settings, stored as camelCase JSON.
///
/// Keys missing from the stored file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginSettings {
    /// GitLab instance URL (e.g., `https://gitlab.com`).
    pub gitlab_url: String,

    /// Personal access token with `api` and `read_repository` scopes.
    pub personal_access_token: String,

    /// Numeric project ID or `group/project` path.
    pub project_id: String,

    /// Entries kept in the vault's `.gitignore`.
    pub ignore_entries: Vec<String>,

    pub refresh_interval_secs: u64,

    pub timeout_secs: u64,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            gitlab_url: DEFAULT_GITLAB_URL.to_string(),
            personal_access_token: String::new(),
            project_id: String::new(),
            ignore_entries: DEFAULT_IGNORE_ENTRIES.iter().map(|e| e.to_string()).collect(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl PluginSettings {
    /// Normalize the URL by removing trailing slashes.
    pub fn normalize_url(url: &str) -> String {
        url.trim().trim_end_matches('/').to_string()
    }

    /// Copy with the token masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.personal_access_token.is_empty() {
            copy.personal_access_token = "********".to_string();
        }
        copy
    }
}
