use std::path::PathBuf;

use miette::Report;

use quarry_lang_driver::MainError;
use quarry_lang_parser::lexer::Lexer;

#[derive(clap::Args)]
pub struct Args {
    #[clap(value_parser, value_name = "FILE")]
    filepath: PathBuf,
}

pub fn exec(args: Args) -> Result<(), Vec<Report>> {
    let src = std::fs::read_to_string(&args.filepath)
        .map_err(|err| vec![Report::from(MainError::from(err))])?;
    for tok in Lexer::new(&src) {
        match tok {
            Ok((start, tok, end)) => println!("{tok} at ({start},{end})"),
            Err((start, err, end)) => println!("{err} at ({start},{end})"),
        }
    }
    Ok(())
}
