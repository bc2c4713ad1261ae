//! GitLab Vault - GitLab merge requests and local Git workflow for a notes
//! vault.
//!
//! The core is a pair of gateways (local Git and GitLab) plus a branch switch
//! coordinator that never loses uncommitted work. The user-facing surfaces
//! are traits; `ui` has terminal implementations used by the binary.

pub mod app;
pub mod args;
pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod ui;

use app::AppContext;
use args::Args;
use clap::Parser;
use error::AppError;
use services::SettingsStore;
use std::process::ExitCode;

/// Parse arguments, run one command and report the result.
pub fn run() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(async move {
        let mut ctx = match load_context(&args).await {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        };

        match commands::dispatch(&mut ctx, args.command).await {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                log::error!("Command failed: {:?}", e);
                ctx.notifier().notify(&e.to_string());
                ExitCode::FAILURE
            }
        }
    })
}

async fn load_context(args: &Args) -> Result<AppContext, AppError> {
    let store = match &args.config {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::default_location()?,
    };
    AppContext::load(&args.dir, store).await
}

/// `warn` by default, raised by `-v`; `RUST_LOG` overrides both.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
