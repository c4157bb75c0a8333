use std::io::Write;
use std::path::PathBuf;

use miette::Report;

use quarry_lang_driver::{FileSystemSource, MainError, Session, SessionOptions};

#[derive(clap::Args)]
pub struct Args {
    #[clap(value_parser, value_name = "FILE")]
    filepath: PathBuf,
    /// Maximal depth of the search tree
    #[clap(long, value_name = "N", default_value_t = 5)]
    max_depth: usize,
    /// Number of threads used by a search
    #[clap(long, value_name = "N", default_value_t = 1)]
    threads: usize,
    /// Print declarations with their full namespace path
    #[clap(long)]
    show_namespaces: bool,
}

pub fn exec(args: Args) -> Result<(), Vec<Report>> {
    let options = SessionOptions {
        max_search_depth: args.max_depth,
        max_search_threads: args.threads.max(1),
        show_namespaces: args.show_namespaces,
    };
    let uri = super::file_uri(&args.filepath)?;
    let mut session = Session::new(FileSystemSource::new("/"), options);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = session.run(&uri, &mut out);
    out.flush().map_err(|err| vec![Report::from(MainError::from(err))])?;
    result
}
