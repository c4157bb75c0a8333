use std::sync::Arc;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use url::Url;

#[derive(Error, Diagnostic, Debug, Clone)]
#[error(transparent)]
#[diagnostic(transparent)]
pub enum MainError {
    Parser(#[from] quarry_lang_parser::ParseError),
    Lowering(#[from] Box<quarry_lang_lowering::LoweringError>),
    Driver(#[from] DriverError),
}

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum DriverError {
    #[error("File not found: {0}")]
    #[diagnostic(code("D-001"))]
    FileNotFound(Url),
    #[error("could not find '{path}'")]
    #[diagnostic(code("D-002"))]
    ImportNotFound {
        path: String,
        #[label]
        span: SourceSpan,
    },
    #[error("error in importing '{path}'")]
    #[diagnostic(code("D-003"))]
    ImportFailed {
        path: String,
        #[label]
        span: SourceSpan,
    },
    #[error("prove expects a base function")]
    #[diagnostic(code("D-004"), help("Only declarations can be proven, not specializations."))]
    ProveExpectsBase {
        #[label]
        span: SourceSpan,
    },
    #[error("IO error: {0}")]
    #[diagnostic(code("D-005"))]
    Io(#[from] Arc<std::io::Error>),
    #[error("Invalid URI: {0}")]
    #[diagnostic(code("D-006"))]
    InvalidUri(Url),
    #[error("Impossible: {0}")]
    #[diagnostic(code("D-XXX"))]
    Impossible(String),
}

impl From<std::io::Error> for DriverError {
    fn from(err: std::io::Error) -> Self {
        DriverError::Io(Arc::new(err))
    }
}

impl From<std::io::Error> for MainError {
    fn from(err: std::io::Error) -> Self {
        MainError::Driver(err.into())
    }
}
