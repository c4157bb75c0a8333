use std::path::PathBuf;

use miette::Report;

use quarry_lang_driver::{FileSystemSource, Session, SessionOptions};

#[derive(clap::Args)]
pub struct Args {
    #[clap(value_parser, value_name = "FILE")]
    filepath: PathBuf,
}

pub fn exec(args: Args) -> Result<(), Vec<Report>> {
    let uri = super::file_uri(&args.filepath)?;
    let mut session = Session::new(FileSystemSource::new("/"), SessionOptions::default());
    session.check(&uri)?;
    println!("{} checked successfully!", args.filepath.display());
    Ok(())
}
