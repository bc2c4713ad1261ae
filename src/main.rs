use std::process::ExitCode;

fn main() -> ExitCode {
    gitlab_vault_lib::run()
}
