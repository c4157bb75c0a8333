use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use miette::Report;
use url::Url;

use quarry_lang_driver::{DriverError, MainError};

use crate::global_settings::GlobalSettings;

mod check;
mod lex;
mod run;
mod terminal;

pub fn exec() -> ExitCode {
    use Command::*;
    let settings = GlobalSettings::from_env();
    settings.init_logger();
    log::debug!("quarry {}", crate::VERSION);

    let cli = Cli::parse();
    let result = match cli.command {
        Run(args) => run::exec(args),
        Check(args) => check::exec(args),
        Lex(args) => lex::exec(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(reports) => {
            terminal::report(&reports, settings.colorize);
            ExitCode::FAILURE
        }
    }
}

#[derive(Parser)]
#[clap(version, author, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a file and print the results of its queries
    Run(run::Args),
    /// Check that a file and its imports are well-formed, without searching
    Check(check::Args),
    /// Print the tokens of a file
    Lex(lex::Args),
}

/// The `file://` URI of the file at `path`.
fn file_uri(path: &Path) -> Result<Url, Vec<Report>> {
    let error = |err: DriverError| vec![Report::from(MainError::from(err))];
    let path = path.canonicalize().map_err(|err| error(err.into()))?;
    Url::from_file_path(&path)
        .map_err(|()| error(DriverError::Impossible(format!("{} is not absolute", path.display()))))
}
