use std::io::{self, Write};
use std::path::Path;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use url::Url;

use crate::phases::*;
use crate::suites::{self, Case, Suite};

pub struct Runner {
    suites: Vec<Suite>,
}

pub struct Config {
    /// Only cases whose suite, name or source contain this string are run
    pub filter: Option<String>,
    /// Print the output of every phase of a failed case
    pub debug: bool,
}

impl Runner {
    pub fn load<P: AsRef<Path>>(suites_path: P) -> io::Result<Self> {
        Ok(Self { suites: suites::load(suites_path.as_ref())? })
    }

    /// Run all testsuites
    pub fn run(&self, config: &Config) -> RunResult {
        let results: Vec<SuiteResult> =
            self.suites.iter().map(|suite| self.run_suite(config, suite)).collect();
        RunResult { results }
    }

    /// Run the cases of one testsuite that match the filter
    pub fn run_suite(&self, config: &Config, suite: &Suite) -> SuiteResult {
        let results = suite
            .cases
            .iter()
            .filter(|case| config.filter.as_deref().is_none_or(|filter| case.matches(filter)))
            .map(|case| {
                let report = self.run_case(&suite.config, case);
                if config.debug && report.result.is_err() {
                    print_phases(case, &report);
                }
                CaseResult { case: case.clone(), result: report.result }
            })
            .collect();
        SuiteResult { suite: suite.clone(), results }
    }

    /// Run one individual testcase within a testsuite
    pub fn run_case(&self, config: &suites::Config, case: &Case) -> CaseReport {
        let input = match case_input(case) {
            Ok(input) => input,
            Err(err) => {
                return CaseReport { phases: vec![], result: Err(Failure::Io(err.to_string())) };
            }
        };
        log::debug!("Running case {}/{}", case.suite, case.name);

        PartialRun::start(input, case, config).then(Parse).then(Lower).then(Run).report()
    }
}

fn case_input(case: &Case) -> io::Result<Input> {
    let path = case.path.canonicalize()?;
    let uri = Url::from_file_path(&path)
        .map_err(|()| io::Error::other(format!("not an absolute path: {}", path.display())))?;
    Ok(Input { uri, source: case.content()? })
}

fn print_phases(case: &Case, report: &CaseReport) {
    println!("Case {}/{}:", case.suite, case.name);
    for PhaseReport { name, output } in &report.phases {
        println!("phase {name}:");
        println!();
        println!("{output}");
        println!();
    }
}

// Run Result
//
//

pub struct RunResult {
    results: Vec<SuiteResult>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.case_results().all(|result| result.result.is_ok())
    }

    pub fn update_expected(&self) -> io::Result<()> {
        for CaseResult { case, result } in self.case_results() {
            if let Some(actual) = result.as_ref().err().and_then(Failure::actual) {
                case.set_expected(actual)?;
            }
        }
        Ok(())
    }

    fn case_results(&self) -> impl Iterator<Item = &CaseResult> {
        self.results.iter().flat_map(|suite_res| suite_res.results.iter())
    }

    pub fn print(&self) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut cases = 0;
        let mut failures = 0;
        for suite in &self.results {
            suite.print(&mut stdout)?;
            let (total, failed) = suite.summary();
            cases += total;
            failures += failed;
        }
        writeln!(stdout, "In total: {}/{} successful", cases - failures, cases)
    }
}

// Suite Result
//
//

pub struct SuiteResult {
    suite: Suite,
    results: Vec<CaseResult>,
}

impl SuiteResult {
    pub fn print(&self, out: &mut StandardStream) -> io::Result<()> {
        let SuiteResult { suite, results } = self;
        writeln!(out, "Suite \"{}\":", suite.name)?;
        for CaseResult { case, result } in results {
            if let Err(err) = result {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                write!(out, "{}", case.name)?;
                out.reset()?;
                writeln!(out, ": {err}")?;
            }
        }
        let (total, failed) = self.summary();
        writeln!(out, "{}/{} successful", total - failed, total)?;
        writeln!(out)
    }

    /// Returns the number of total cases and the number of failures.
    pub fn summary(&self) -> (usize, usize) {
        let failures = self.results.iter().filter(|e| e.result.is_err()).count();
        (self.results.len(), failures)
    }
}

// Case Result
//
//

pub struct CaseResult {
    case: Case,
    result: Result<String, Failure>,
}
