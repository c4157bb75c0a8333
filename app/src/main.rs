use std::process::ExitCode;

mod cli;
mod global_settings;

/// The version of this build, as reported by `git describe` when available.
pub const VERSION: &str = env!("VERSION");

fn main() -> ExitCode {
    cli::exec()
}
