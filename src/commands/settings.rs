//! Settings commands.
//!
//! Settings are persisted as JSON through [`SettingsStore`]; the access
//! token can live in the OS keychain instead of the file.
//!
//! [`SettingsStore`]: crate::services::SettingsStore

use super::print_json;
use crate::app::AppContext;
use crate::args::{ConfigAction, TokenAction};
use crate::error::AppError;
use crate::services::CredentialService;

pub async fn config(ctx: &mut AppContext, action: ConfigAction) -> Result<bool, AppError> {
    match action {
        ConfigAction::Show => {
            print_json(&ctx.settings().redacted())?;
            Ok(true)
        }
        ConfigAction::Set { key, value } => {
            ctx.update_setting(&key, &value).await?;
            ctx.notifier().notify(&format!("Saved {}", key));
            if !ctx.remote().is_configured() {
                ctx.notifier().notify(
                    "GitLab is not fully configured yet (URL, access token and project ID are required)",
                );
            }
            Ok(true)
        }
    }
}

pub async fn token(ctx: &mut AppContext, action: TokenAction) -> Result<bool, AppError> {
    let url = ctx.settings().gitlab_url.clone();

    match action {
        TokenAction::Set { token } => {
            let token = token.trim();
            if token.is_empty() {
                return Err(AppError::invalid_input_field(
                    "Token must not be empty",
                    "token",
                ));
            }
            CredentialService::store_token(&url, token)?;
            ctx.notifier()
                .notify(&format!("Access token stored in the keychain for {}", url));
        }
        TokenAction::Delete => {
            CredentialService::delete_token(&url)?;
            ctx.notifier()
                .notify(&format!("Access token removed from the keychain for {}", url));
        }
    }

    if !ctx.settings().personal_access_token.trim().is_empty() {
        ctx.notifier()
            .notify("Note: the token in the settings file takes precedence over the keychain");
    }

    ctx.reinitialize_clients();
    Ok(true)
}
