use std::rc::Rc;

use quarry_lang_miette_util::Span;

use super::ident::{Ident, Path};

#[derive(Debug, Clone)]
pub enum Exp {
    Var(Path),
    App(App),
    Lam(Lam),
    StructLit(StructLit),
}

impl Exp {
    pub fn span(&self) -> Span {
        match self {
            Exp::Var(path) => path.span,
            Exp::App(app) => app.span,
            Exp::Lam(lam) => lam.span,
            Exp::StructLit(lit) => lit.span,
        }
    }
}

/// Application of a term to explicit arguments
///
/// ```text
/// f a (g b)
/// ^ ^^^^^^^
/// |    \----- args
/// \---------- fun
/// ```
#[derive(Debug, Clone)]
pub struct App {
    pub span: Span,
    pub fun: Rc<Exp>,
    pub args: Vec<Rc<Exp>>,
}

/// Lambda abstraction, written with either `λ` or `\`
///
/// ```text
/// λ (x : A) := e
///   ^^^^^^^    ^----- body
///      \------------- params
/// ```
#[derive(Debug, Clone)]
pub struct Lam {
    pub span: Span,
    pub params: Params,
    pub body: Rc<Exp>,
}

/// Instance of a structure given by its fields
///
/// ```text
/// Monoid M { e := unit, op := mul }
/// ^^^^^^^^   ^^^^^^^^^^^^^^^^^^^^
///    |                 \-------------- fields
///    \-------------------------------- exp
/// ```
#[derive(Debug, Clone)]
pub struct StructLit {
    pub span: Span,
    pub exp: Rc<Exp>,
    pub fields: Vec<Binding>,
}

pub type Params = Vec<Param>;

/// A group of parameters in parentheses, or in braces if they are implicit
#[derive(Debug, Clone)]
pub struct Param {
    pub span: Span,
    pub implicit: bool,
    pub binding: Binding,
}

/// A binding of one or more names, such as `x y : A` or `f (n : Nat) := succ n`
#[derive(Debug, Clone)]
pub struct Binding {
    pub span: Span,
    pub names: Vec<Ident>,
    pub params: Params,
    pub body: Body,
}

#[derive(Debug, Clone)]
pub enum Body {
    /// `: T`
    Type(Rc<Exp>),
    /// `:= e`
    Value(Rc<Exp>),
}
