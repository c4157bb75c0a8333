use miette::Diagnostic;
use thiserror::Error;

/// The result type specialized to specialization errors.
pub type SpecResult<T> = Result<T, SpecializationError>;

/// Errors that can be emitted when a term is applied to arguments.
///
/// These are user errors: the offending statement fails, but the session continues.
/// The terms involved are stored in printed form.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum SpecializationError {
    #[error("{term} expected at most {expected} arguments but received {actual}")]
    #[diagnostic(code("K-001"))]
    ArgumentCount { term: String, expected: usize, actual: usize },
    #[error("argument '{argument}' does not match '{parameter}'")]
    #[diagnostic(code("K-002"))]
    MismatchedArgument { parameter: String, argument: String },
    #[error("could not infer implicit argument '{parameter}'")]
    #[diagnostic(code("K-003"))]
    UnresolvedImplicit { parameter: String },
}
