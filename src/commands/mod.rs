//! Command handlers.
//!
//! Commands are organized by functionality:
//! - `git`: commit, push, pull, branch switching and status
//! - `merge_requests`: listing, detail, checkout, merge and creation
//! - `settings`: settings file and keychain token
//!
//! Handlers return `Ok(false)` when the operation failed but the failure was
//! already reported to the user, and `Err` for failures nobody reported yet.

pub mod git;
pub mod merge_requests;
pub mod settings;

use crate::app::AppContext;
use crate::args::Command;
use crate::error::AppError;

/// Run one command against the context.
pub async fn dispatch(ctx: &mut AppContext, command: Command) -> Result<bool, AppError> {
    match command {
        Command::MergeRequests {
            state,
            search,
            json,
        } => merge_requests::list(ctx, state.into(), search.as_deref(), json).await,
        Command::Show { iid, json } => merge_requests::show(ctx, iid, json).await,
        Command::Checkout { iid } => merge_requests::checkout(ctx, iid).await,
        Command::Merge {
            iid,
            message,
            squash,
        } => merge_requests::merge(ctx, iid, message.as_deref(), squash).await,
        Command::CreateMr {
            source,
            target,
            title,
            description,
        } => merge_requests::create(ctx, &source, &target, &title, &description).await,
        Command::Commit { message } => git::commit(ctx, message).await,
        Command::Push => git::push(ctx).await,
        Command::Pull => git::pull(ctx).await,
        Command::SwitchBranch { branch } => git::switch_branch(ctx, branch).await,
        Command::CreateBranch { name } => git::create_branch(ctx, name).await,
        Command::CheckoutMain => git::checkout_main(ctx).await,
        Command::Status { json } => git::status(ctx, json).await,
        Command::Watch { interval } => git::watch(ctx, interval).await,
        Command::Gitignore { fix } => git::gitignore(ctx, fix).await,
        Command::Init => git::init(ctx).await,
        Command::Config { action } => settings::config(ctx, action).await,
        Command::Token { action } => settings::token(ctx, action).await,
    }
}

/// Print a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
