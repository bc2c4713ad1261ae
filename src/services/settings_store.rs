//! Settings persistence.
//!
//! Settings live in a single JSON file. A missing file means defaults; stored
//! keys are merged over the defaults on load.

use crate::error::AppError;
use crate::models::PluginSettings;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Store filename for settings.
const SETTINGS_FILE: &str = "settings.json";

/// JSON-file backed settings store.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    /// Store at an explicit file path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform configuration directory.
    pub fn default_location() -> Result<Self, AppError> {
        let dirs = ProjectDirs::from("", "", "gitlab-vault")
            .ok_or_else(|| AppError::settings("Could not determine configuration directory"))?;
        Ok(Self::at(dirs.config_dir().join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, using defaults if the file does not exist.
    ///
    /// Stored durations must be positive, the same as for [`apply`].
    ///
    /// [`apply`]: SettingsStore::apply
    pub async fn load(&self) -> Result<PluginSettings, AppError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("[settings] {} not found, using defaults", self.path.display());
                return Ok(PluginSettings::default());
            }
            Err(e) => {
                return Err(AppError::settings(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let settings: PluginSettings = serde_json::from_str(&content).map_err(|e| {
            AppError::settings(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;

        for (key, secs) in [
            ("refreshIntervalSecs", settings.refresh_interval_secs),
            ("timeoutSecs", settings.timeout_secs),
        ] {
            if secs == 0 {
                return Err(AppError::settings(format!(
                    "Invalid {} in {}: must be a positive number of seconds",
                    key,
                    self.path.display()
                )));
            }
        }
        Ok(settings)
    }

    /// Save settings, creating the parent directory if needed.
    pub async fn save(&self, settings: &PluginSettings) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::settings(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        tokio::fs::write(&self.path, content).await.map_err(|e| {
            AppError::settings(format!("Failed to save {}: {}", self.path.display(), e))
        })?;

        log::info!("[settings] Saved {}", self.path.display());
        Ok(())
    }

    /// Apply one `key = value` change to `settings`.
    ///
    /// Keys use the same camelCase names as the stored file.
    pub fn apply(settings: &mut PluginSettings, key: &str, value: &str) -> Result<(), AppError> {
        match key {
            "gitlabUrl" => settings.gitlab_url = PluginSettings::normalize_url(value),
            "personalAccessToken" => settings.personal_access_token = value.trim().to_string(),
            "projectId" => settings.project_id = value.trim().to_string(),
            "ignoreEntries" => {
                settings.ignore_entries = value
                    .split(',')
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(String::from)
                    .collect();
            }
            "refreshIntervalSecs" => settings.refresh_interval_secs = parse_secs(key, value)?,
            "timeoutSecs" => settings.timeout_secs = parse_secs(key, value)?,
            _ => {
                return Err(AppError::invalid_input_field(
                    format!("Unknown setting '{}'", key),
                    key,
                ))
            }
        }
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, AppError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(AppError::invalid_input_field(
            format!("'{}' must be a positive number of seconds", value),
            key,
        )),
    }
}
