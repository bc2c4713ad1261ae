//! Credential storage service using the OS keychain.
//!
//! The personal access token can be kept out of the settings file by storing
//! it in the system's native credential storage (Keychain on macOS,
//! Credential Manager on Windows, Secret Service on Linux).

use crate::error::AppError;
use crate::models::PluginSettings;
use keyring::Entry;

/// Service name used in the keychain.
const SERVICE_NAME: &str = "gitlab-vault";

/// Credential storage operations.
pub struct CredentialService;

impl CredentialService {
    /// Store a token for a GitLab instance.
    pub fn store_token(instance_url: &str, token: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(instance_url)?;

        entry
            .set_password(token)
            .map_err(|e| AppError::credential_storage(format!("Failed to store token: {}", e)))
    }

    /// Retrieve a token for a GitLab instance.
    ///
    /// Returns `Ok(None)` when no token is stored.
    pub fn get_token(instance_url: &str) -> Result<Option<String>, AppError> {
        let entry = Self::get_entry(instance_url)?;

        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to retrieve token: {}",
                e
            ))),
        }
    }

    /// Delete a token for a GitLab instance.
    ///
    /// This operation is idempotent - deleting a non-existent token is not an error.
    pub fn delete_token(instance_url: &str) -> Result<(), AppError> {
        let entry = Self::get_entry(instance_url)?;

        match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AppError::credential_storage(format!(
                "Failed to delete token: {}",
                e
            ))),
        }
    }

    /// Fill in the token from the keychain when the settings file has none.
    ///
    /// Keychain failures are logged and leave the settings unchanged.
    pub fn resolve_token(settings: &mut PluginSettings) {
        if !settings.personal_access_token.trim().is_empty() {
            return;
        }

        match Self::get_token(&settings.gitlab_url) {
            Ok(Some(token)) => settings.personal_access_token = token,
            Ok(None) => {}
            Err(e) => log::warn!("[settings] Keychain lookup failed: {}", e),
        }
    }

    /// Create a keyring entry for the given instance URL.
    fn get_entry(instance_url: &str) -> Result<Entry, AppError> {
        let account = normalize_url(instance_url);

        Entry::new(SERVICE_NAME, &account).map_err(|e| {
            AppError::credential_storage(format!("Failed to create keyring entry: {}", e))
        })
    }
}

/// Normalize a URL for use as an account identifier.
///
/// Removes trailing slashes and converts to lowercase.
fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_lowercase()
}
