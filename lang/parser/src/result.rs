use miette::{Diagnostic, SourceSpan};
use quarry_lang_miette_util::{Span, ToMiette};
use thiserror::Error;

use crate::lexer::{LexicalError, Token};

#[derive(Error, Diagnostic, Debug, Clone)]
pub enum ParseError {
    #[error("Invalid token")]
    #[diagnostic(code("P-001"))]
    InvalidToken {
        #[label]
        span: SourceSpan,
    },
    #[error("Unexpected end of file. Expected {expected}")]
    #[diagnostic(code("P-002"))]
    UnrecognizedEof {
        expected: String,
        #[label]
        span: SourceSpan,
    },
    #[error("Unexpected \"{token}\", expected {expected}")]
    #[diagnostic(code("P-003"))]
    UnrecognizedToken {
        token: String,
        expected: String,
        #[label]
        span: SourceSpan,
    },
    #[error("Excessive \"{token}\"")]
    #[diagnostic(code("P-004"))]
    ExtraToken {
        token: String,
        #[label]
        span: SourceSpan,
    },
}

fn separated(s: Vec<String>) -> String {
    let n = s.len();
    s.into_iter()
        .enumerate()
        .map(|(i, s)| match i {
            0 => s,
            _ if i == n - 1 => format!(" or {s}"),
            _ => format!(", {s}"),
        })
        .collect()
}

fn span(l: usize, r: usize) -> SourceSpan {
    Span::new(l, r).to_miette()
}

type LalrpopError = lalrpop_util::ParseError<usize, Token, (usize, LexicalError, usize)>;

impl From<LalrpopError> for ParseError {
    fn from(err: LalrpopError) -> Self {
        use lalrpop_util::ParseError::*;
        match err {
            InvalidToken { location } => ParseError::InvalidToken { span: span(location, location) },
            UnrecognizedEof { location, expected } => {
                ParseError::UnrecognizedEof { expected: separated(expected), span: span(location, location) }
            }
            UnrecognizedToken { token: (l, token, r), expected } => ParseError::UnrecognizedToken {
                token: token.to_string(),
                expected: separated(expected),
                span: span(l, r),
            },
            ExtraToken { token: (l, token, r) } => {
                ParseError::ExtraToken { token: token.to_string(), span: span(l, r) }
            }
            User { error: (l, LexicalError::InvalidToken, r) } => {
                ParseError::InvalidToken { span: span(l, r) }
            }
        }
    }
}
