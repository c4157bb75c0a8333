use miette::{Diagnostic, SourceSpan};
use quarry_lang_kernel::SpecializationError;
use thiserror::Error;

pub type LoweringResult<T> = Result<T, Box<LoweringError>>;

#[derive(Error, Diagnostic, Debug, Clone)]
pub enum LoweringError {
    #[error("unknown identifier '{name}'")]
    #[diagnostic(code("L-001"))]
    UnknownIdentifier {
        name: String,
        #[label]
        span: SourceSpan,
    },
    #[error("ambiguous identifier '{name}', could be {candidates}")]
    #[diagnostic(code("L-002"))]
    AmbiguousIdentifier {
        name: String,
        candidates: String,
        #[label]
        span: SourceSpan,
    },
    #[error("identifier '{name}' already used in this context")]
    #[diagnostic(code("L-003"))]
    AlreadyDefined {
        name: String,
        #[label]
        span: SourceSpan,
    },
    #[error("expected a Type or Prop")]
    #[diagnostic(code("L-004"))]
    ExpectedTypeOrProp {
        #[label]
        span: SourceSpan,
    },
    #[error("type of function may not have parameters")]
    #[diagnostic(code("L-005"))]
    TypeHasParameters {
        #[label]
        span: SourceSpan,
    },
    #[error("implicit parameter {param} cannot be inferred")]
    #[diagnostic(code("L-006"), help("Use the parameter in the type of a later explicit parameter"))]
    ImplicitNotInferable {
        param: String,
        #[label]
        span: SourceSpan,
    },
    #[error("definition does not allow multiple identifiers")]
    #[diagnostic(code("L-007"))]
    MultipleNamesInDefinition {
        #[label]
        span: SourceSpan,
    },
    #[error("{term} does not have a constructor")]
    #[diagnostic(code("L-008"))]
    NoConstructor {
        term: String,
        #[label]
        span: SourceSpan,
    },
    #[error("missing field '{name}'")]
    #[diagnostic(code("L-009"))]
    MissingField {
        name: String,
        #[label]
        span: SourceSpan,
    },
    #[error("{structure} has no field '{name}'")]
    #[diagnostic(code("L-010"))]
    UnknownField {
        name: String,
        structure: String,
        #[label]
        span: SourceSpan,
    },
    #[error("field '{name}' needs a value")]
    #[diagnostic(code("L-011"), help("Write `{name} := ...`"))]
    FieldWithoutValue {
        name: String,
        #[label]
        span: SourceSpan,
    },
    #[error("{fun} expected at most {expected} explicit arguments but received {actual}")]
    #[diagnostic(code("L-012"))]
    TooManyArguments {
        fun: String,
        expected: usize,
        actual: usize,
        #[label]
        span: SourceSpan,
    },
    #[error("no namespace '{path}'")]
    #[diagnostic(code("L-013"))]
    UnknownNamespace {
        path: String,
        #[label]
        span: SourceSpan,
    },
    #[error("expected '{expected}'")]
    #[diagnostic(code("L-014"))]
    MismatchedNamespaceEnd {
        expected: String,
        #[label]
        span: SourceSpan,
    },
    #[error("{inner}")]
    #[diagnostic(code("L-015"))]
    Specialization {
        inner: SpecializationError,
        #[label]
        span: SourceSpan,
    },
    #[error("An unexpected internal error occurred: {message}")]
    #[diagnostic(code("L-XXX"))]
    /// This error should not occur.
    /// Some internal invariant has been violated.
    Impossible {
        message: String,
        #[label]
        span: Option<SourceSpan>,
    },
}
