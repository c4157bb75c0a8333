mod phases;
mod runner;
mod suites;

use clap::Parser;

pub const TEST_SUITES_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../suites");

/// Quarry Testsuite Runner
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Only run cases whose suite, name or source contain this string
    #[clap(long)]
    filter: Option<String>,
    /// Print the output of every phase of a failing case
    #[clap(long, num_args = 0)]
    debug: bool,
    /// Overwrite the expected output of failing cases with their actual output
    #[clap(long, num_args = 0)]
    update_expected: bool,
}

fn main() {
    env_logger::builder().format_timestamp(None).format_level(false).format_target(false).init();
    let args = Args::parse();
    let runner = match runner::Runner::load(TEST_SUITES_PATH) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("Failed to load the test suites from {TEST_SUITES_PATH}: {err}");
            std::process::exit(1);
        }
    };
    let config = runner::Config { filter: args.filter, debug: args.debug };
    let res = runner.run(&config);

    let printed = if args.update_expected {
        res.update_expected().map(|()| println!("Updated expected outputs."))
    } else {
        res.print()
    };
    if let Err(err) = printed {
        eprintln!("{err}");
        std::process::exit(1);
    }
    if !args.update_expected && !res.success() {
        std::process::exit(1);
    }
}
