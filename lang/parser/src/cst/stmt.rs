use std::rc::Rc;

use quarry_lang_miette_util::Span;
use url::Url;

use super::exp::{Binding, Body, Exp, Params};
use super::ident::{Ident, Path};

#[derive(Debug, Clone)]
pub struct DocComment {
    pub docs: Vec<String>,
}

impl DocComment {
    pub fn text(&self) -> String {
        self.docs.join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct Module {
    /// The location of the module on disk
    pub uri: Url,
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Empty(Span),
    Let(Let),
    Structure(Structure),
    Namespace(Namespace),
    Open(NsPath),
    Close(NsPath),
    Import(Import),
    Check(Query),
    Docs(Query),
    Prove(Query),
    Search(Search),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Empty(span) => *span,
            Stmt::Let(stmt) => stmt.span,
            Stmt::Structure(stmt) => stmt.span,
            Stmt::Namespace(stmt) => stmt.span,
            Stmt::Open(stmt) | Stmt::Close(stmt) => stmt.span,
            Stmt::Import(stmt) => stmt.span,
            Stmt::Check(stmt) | Stmt::Docs(stmt) | Stmt::Prove(stmt) => stmt.span,
            Stmt::Search(stmt) => stmt.span,
        }
    }
}

/// Declaration or definition at the level of a namespace
///
/// ```text
/// let [10] f g (x : A) : T
///      ^^  ^^^ ^^^^^^^ ^^^
///      |    |     |     \---- body
///      |    |     \---------- params
///      |    \---------------- names
///      \--------------------- preference
/// ```
/// Definitions `let f (x : A) := e` only allow a single name.
#[derive(Debug, Clone)]
pub struct Let {
    pub span: Span,
    pub doc: Option<DocComment>,
    pub preference: Option<i32>,
    pub names: Vec<Path>,
    pub params: Params,
    pub body: Body,
}

/// Structure declaration
///
/// ```text
/// structure Monoid (M : Type) := { e : M, op (x y : M) : M }
///           ^^^^^^ ^^^^^^^^^^     ^^^^^^^^^^^^^^^^^^^^^^^
///             |        |                    \---------------- fields
///             |        \------------------------------------- params
///             \---------------------------------------------- name
/// ```
#[derive(Debug, Clone)]
pub struct Structure {
    pub span: Span,
    pub doc: Option<DocComment>,
    pub name: Ident,
    pub params: Params,
    pub fields: Vec<Binding>,
}

/// ```text
/// namespace Arith ... end Arith
/// ```
#[derive(Debug, Clone)]
pub struct Namespace {
    pub span: Span,
    pub name: Path,
    pub stmts: Vec<Stmt>,
    pub end: Path,
}

/// Argument of `open` and `close`; `A.*` also selects all namespaces nested in `A`.
#[derive(Debug, Clone)]
pub struct NsPath {
    pub span: Span,
    pub path: Path,
    pub recursive: bool,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub span: Span,
    pub path: String,
}

/// Argument of `check`, `docs` and `prove`.
#[derive(Debug, Clone)]
pub struct Query {
    pub span: Span,
    pub exp: Rc<Exp>,
}

/// ```text
/// search 3 (x : A) (y : B x)
///        ^ ^^^^^^^^^^^^^^^^^
///        |         \---------- params
///        \-------------------- max_results
/// ```
#[derive(Debug, Clone)]
pub struct Search {
    pub span: Span,
    pub max_results: Option<usize>,
    pub params: Params,
}
