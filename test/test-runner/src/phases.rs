use std::fmt;

use miette::Report;
use url::Url;

use quarry_lang_driver::{FileSystemSource, Session, SessionOptions};

use crate::suites::{Case, Config};

/// The source of a case, together with the URI it is run under.
pub struct Input {
    pub uri: Url,
    pub source: String,
}

pub trait Phase {
    fn name(&self) -> &'static str;
    /// The output of the phase if it succeeds, its error messages otherwise.
    fn run(&self, input: &Input) -> Result<String, String>;
}

/// Parse the case on its own.
pub struct Parse;

/// Lower the case and everything it imports without searching.
pub struct Lower;

/// Run the case and collect what it prints.
pub struct Run;

impl Phase for Parse {
    fn name(&self) -> &'static str {
        "parse"
    }

    fn run(&self, input: &Input) -> Result<String, String> {
        quarry_lang_parser::parse_module(input.uri.clone(), &input.source)
            .map(|module| format!("{} statements", module.stmts.len()))
            .map_err(|err| err.to_string())
    }
}

impl Phase for Lower {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn run(&self, input: &Input) -> Result<String, String> {
        let mut session = Session::new(FileSystemSource::new("/"), SessionOptions::default());
        session.check(&input.uri).map(|()| String::new()).map_err(|reports| messages(&reports))
    }
}

impl Phase for Run {
    fn name(&self) -> &'static str {
        "run"
    }

    fn run(&self, input: &Input) -> Result<String, String> {
        let mut session = Session::new(FileSystemSource::new("/"), SessionOptions::default());
        let mut out = Vec::new();
        session.run(&input.uri, &mut out).map_err(|reports| messages(&reports))?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

fn messages(reports: &[Report]) -> String {
    let messages: Vec<String> = reports.iter().map(|report| format!("{report}\n")).collect();
    messages.concat()
}

pub struct PhaseReport {
    pub name: &'static str,
    pub output: String,
}

/// The outcome of a case: the output which was compared against the expectation, or why the
/// case failed.
pub struct CaseReport {
    pub phases: Vec<PhaseReport>,
    pub result: Result<String, Failure>,
}

/// Runs the phases of one case until one of them settles its outcome.
pub struct PartialRun<'a> {
    input: Input,
    case: &'a Case,
    config: &'a Config,
    phases: Vec<PhaseReport>,
    /// The output of the last phase, if no phase settled the outcome yet
    state: Result<String, Result<String, Failure>>,
}

impl<'a> PartialRun<'a> {
    pub fn start(input: Input, case: &'a Case, config: &'a Config) -> Self {
        PartialRun { input, case, config, phases: Vec::new(), state: Ok(String::new()) }
    }

    pub fn then<P: Phase>(mut self, phase: P) -> Self {
        if self.state.is_err() {
            return self;
        }
        let expect_failure = self.config.fail.as_deref() == Some(phase.name());
        let result = phase.run(&self.input);
        let output = match &result {
            Ok(output) | Err(output) => output.clone(),
        };
        self.phases.push(PhaseReport { name: phase.name(), output });

        self.state = match result {
            Ok(output) if expect_failure => Err(Err(Failure::ExpectedFailure { got: output })),
            Ok(output) => Ok(output),
            Err(err) if expect_failure => Err(self.compare(err)),
            Err(err) => Err(Err(Failure::ExpectedSuccess { phase: phase.name(), got: err })),
        };
        self
    }

    pub fn report(mut self) -> CaseReport {
        let result = match std::mem::replace(&mut self.state, Ok(String::new())) {
            Ok(output) => self.compare(output),
            Err(settled) => settled,
        };
        CaseReport { phases: self.phases, result }
    }

    fn compare(&self, actual: String) -> Result<String, Failure> {
        match self.case.expected() {
            Ok(Some(expected)) if expected != actual => Err(Failure::Mismatch { expected, actual }),
            Ok(Some(_)) => Ok(actual),
            Ok(None) => Err(Failure::MissingExpected { actual }),
            Err(err) => Err(Failure::Io(err.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum Failure {
    Mismatch { expected: String, actual: String },
    MissingExpected { actual: String },
    ExpectedFailure { got: String },
    ExpectedSuccess { phase: &'static str, got: String },
    Io(String),
}

impl Failure {
    /// The output an updated `.expected` file should contain.
    pub fn actual(&self) -> Option<&str> {
        match self {
            Failure::Mismatch { actual, .. } | Failure::MissingExpected { actual } => Some(actual),
            _ => None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Mismatch { expected, actual } => {
                write!(f, "\n  Expected : {expected}\n  Got      : {actual}")
            }
            Failure::MissingExpected { .. } => write!(f, "No expected output"),
            Failure::ExpectedFailure { got } => write!(f, "Expected failure, got {got:?}"),
            Failure::ExpectedSuccess { phase, got } => {
                write!(f, "Expected success in phase {phase}, got {got}")
            }
            Failure::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}
